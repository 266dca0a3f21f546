//! Host callables addressable by owner and method name

use sqlforge_ir::{TrimFlag, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::expression::{HostKind, HostType};
use crate::EvalError;

pub type HostFn = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// Owner of the built-in SQL runtime functions.
pub const SQL_FUNCTIONS: &str = "SqlFunctions";

static STANDARD: LazyLock<MethodTable> = LazyLock::new(|| {
    let mut table = MethodTable::new();
    register_sql_functions(&mut table);
    table
});

/// Declared signature and body of one host method overload.
#[derive(Clone)]
pub struct HostMethod {
    pub owner: String,
    pub name: String,
    pub params: Vec<HostType>,
    pub returns: HostType,
    pub body: HostFn,
}

impl fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostMethod")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MethodTable {
    // (owner, method) -> overloads
    methods: HashMap<(String, String), Vec<HostMethod>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in SQL runtime functions.
    pub fn standard() -> &'static MethodTable {
        &STANDARD
    }

    /// Adds an overload, replacing one with the same owner, name and
    /// parameter count.
    pub fn register<F>(&mut self, owner: &str, name: &str, params: Vec<HostType>, returns: HostType, body: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let method = HostMethod {
            owner: owner.to_string(),
            name: name.to_string(),
            params,
            returns,
            body: Arc::new(body),
        };
        let overloads = self
            .methods
            .entry((owner.to_string(), name.to_string()))
            .or_default();
        overloads.retain(|m| m.params.len() != method.params.len());
        overloads.push(method);
    }

    pub fn contains(&self, owner: &str, name: &str) -> bool {
        self.methods.contains_key(&(owner.to_string(), name.to_string()))
    }

    pub fn overloads(&self, owner: &str, name: &str) -> &[HostMethod] {
        self.methods
            .get(&(owner.to_string(), name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The overload taking `count` arguments.
    pub fn resolve(&self, owner: &str, name: &str, count: usize) -> Option<&HostMethod> {
        self.overloads(owner, name).iter().find(|m| m.params.len() == count)
    }

    pub fn invoke(&self, owner: &str, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let method = self
            .resolve(owner, name, args.len())
            .ok_or_else(|| EvalError::MethodNotFound {
                owner: owner.to_string(),
                method: name.to_string(),
            })?;
        (method.body)(args)
    }
}

/// Wraps a body so that any null argument yields null.
fn strict<F>(f: F) -> impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static
where
    F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
{
    move |args: &[Value]| {
        if args.iter().any(Value::is_null) {
            Ok(Value::Null)
        } else {
            f(args)
        }
    }
}

fn as_str<'v>(v: &'v Value, method: &str) -> Result<&'v str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(EvalError::TypeMismatch(format!("{} expects a string, got {}", method, other))),
    }
}

fn as_int(v: &Value, method: &str) -> Result<i64, EvalError> {
    match v {
        Value::Int(i) => Ok(*i),
        other => Err(EvalError::TypeMismatch(format!("{} expects an integer, got {}", method, other))),
    }
}

/// SQL SUBSTRING: 1-based start, positions before 1 shorten the result.
fn substring(s: &str, start: i64, length: Option<i64>) -> Result<String, EvalError> {
    if let Some(len) = length {
        if len < 0 {
            return Err(EvalError::Method(format!("negative substring length {}", len)));
        }
    }
    let end = length.map(|len| start.saturating_add(len));
    let from = start.max(1);
    Ok(s.chars()
        .enumerate()
        .map(|(i, c)| (i as i64 + 1, c))
        .filter(|(pos, _)| *pos >= from && end.map_or(true, |e| *pos < e))
        .map(|(_, c)| c)
        .collect())
}

fn trim(flag: TrimFlag, chars: &str, s: &str) -> String {
    let matches = |c: char| chars.contains(c);
    match flag {
        TrimFlag::Both => s.trim_matches(matches),
        TrimFlag::Leading => s.trim_start_matches(matches),
        TrimFlag::Trailing => s.trim_end_matches(matches),
    }
    .to_string()
}

fn register_sql_functions(table: &mut MethodTable) {
    let str_ty = HostType::boxed(HostKind::String);
    let int_ty = HostType::boxed(HostKind::Int);
    let obj_ty = HostType::boxed(HostKind::Object);

    table.register(SQL_FUNCTIONS, "upper", vec![str_ty], str_ty, strict(|args: &[Value]| {
        Ok(Value::String(as_str(&args[0], "upper")?.to_uppercase()))
    }));
    table.register(SQL_FUNCTIONS, "lower", vec![str_ty], str_ty, strict(|args: &[Value]| {
        Ok(Value::String(as_str(&args[0], "lower")?.to_lowercase()))
    }));
    table.register(SQL_FUNCTIONS, "charLength", vec![str_ty], int_ty, strict(|args: &[Value]| {
        Ok(Value::Int(as_str(&args[0], "charLength")?.chars().count() as i64))
    }));
    table.register(SQL_FUNCTIONS, "substring", vec![str_ty, int_ty], str_ty, strict(|args: &[Value]| {
        let s = as_str(&args[0], "substring")?;
        Ok(Value::String(substring(s, as_int(&args[1], "substring")?, None)?))
    }));
    table.register(
        SQL_FUNCTIONS,
        "substring",
        vec![str_ty, int_ty, int_ty],
        str_ty,
        strict(|args: &[Value]| {
            let s = as_str(&args[0], "substring")?;
            let start = as_int(&args[1], "substring")?;
            let len = as_int(&args[2], "substring")?;
            Ok(Value::String(substring(s, start, Some(len))?))
        }),
    );
    table.register(
        SQL_FUNCTIONS,
        "trim",
        vec![HostType::boxed(HostKind::Symbol), str_ty, str_ty],
        str_ty,
        strict(|args: &[Value]| {
            let flag = match &args[0] {
                Value::Symbol { flag } => *flag,
                other => return Err(EvalError::TypeMismatch(format!("trim expects a flag, got {}", other))),
            };
            let chars = as_str(&args[1], "trim")?;
            if chars.chars().count() != 1 {
                return Err(EvalError::Method(format!(
                    "trim character must be a single character, got {:?}",
                    chars
                )));
            }
            Ok(Value::String(trim(flag, chars, as_str(&args[2], "trim")?)))
        }),
    );
    table.register(SQL_FUNCTIONS, "abs", vec![obj_ty], obj_ty, strict(|args: &[Value]| match &args[0] {
        Value::Int(i) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| EvalError::Method("abs overflow".to_string())),
        Value::Float(x) => Ok(Value::Float(x.abs())),
        other => Err(EvalError::TypeMismatch(format!("abs expects a number, got {}", other))),
    }));
    table.register(SQL_FUNCTIONS, "pi", vec![], HostType::primitive(HostKind::Double), |_: &[Value]| {
        Ok(Value::Float(std::f64::consts::PI))
    });
    table.register(
        SQL_FUNCTIONS,
        "nullIndicator",
        vec![obj_ty],
        HostType::primitive(HostKind::Int),
        |args: &[Value]| Ok(Value::Int(i64::from(args.first().map_or(true, Value::is_null)))),
    );
}
