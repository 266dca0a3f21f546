//! Host expression tree produced by lowering

use serde::{Deserialize, Serialize};
use sqlforge_ir::{SqlType, TypeName, Value};
use std::fmt;

/// Runtime representation of a value on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    Bool,
    Int,
    Long,
    Double,
    String,
    Symbol,
    Object,
}

impl HostKind {
    /// Primitive kinds have an unboxed form that cannot hold null.
    pub fn is_primitive(&self) -> bool {
        matches!(self, HostKind::Bool | HostKind::Int | HostKind::Long | HostKind::Double)
    }

    fn name(&self, boxed: bool) -> &'static str {
        match (self, boxed) {
            (HostKind::Bool, false) => "boolean",
            (HostKind::Bool, true) => "Boolean",
            (HostKind::Int, false) => "int",
            (HostKind::Int, true) => "Integer",
            (HostKind::Long, false) => "long",
            (HostKind::Long, true) => "Long",
            (HostKind::Double, false) => "double",
            (HostKind::Double, true) => "Double",
            (HostKind::String, _) => "String",
            (HostKind::Symbol, _) => "Symbol",
            (HostKind::Object, _) => "Object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostType {
    pub kind: HostKind,
    pub boxed: bool,
}

impl HostType {
    pub const fn new(kind: HostKind, boxed: bool) -> Self {
        Self { kind, boxed }
    }

    pub const fn primitive(kind: HostKind) -> Self {
        Self { kind, boxed: false }
    }

    pub const fn boxed(kind: HostKind) -> Self {
        Self { kind, boxed: true }
    }

    /// Host representation of a SQL type; nullable primitives are boxed.
    pub fn of(ty: &SqlType) -> Self {
        let kind = match ty.name {
            TypeName::Boolean => HostKind::Bool,
            TypeName::TinyInt | TypeName::SmallInt | TypeName::Integer => HostKind::Int,
            TypeName::Date | TypeName::Time | TypeName::IntervalYearMonth => HostKind::Int,
            TypeName::BigInt | TypeName::Timestamp | TypeName::IntervalDayTime => HostKind::Long,
            TypeName::Decimal { .. } | TypeName::Real | TypeName::Double => HostKind::Double,
            TypeName::Char | TypeName::Varchar => HostKind::String,
            TypeName::Symbol => HostKind::Symbol,
            TypeName::Null | TypeName::Any => HostKind::Object,
        };
        Self {
            kind,
            boxed: ty.nullable || !kind.is_primitive(),
        }
    }

    pub fn can_hold_null(&self) -> bool {
        self.boxed || !self.kind.is_primitive()
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name(self.boxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::AndAlso => "&&",
            BinaryOp::OrElse => "||",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Negate,
    Not,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expression {
    Constant {
        value: Value,
        ty: HostType,
    },
    /// Field `index` of the current input row.
    Parameter {
        index: usize,
        ty: HostType,
    },
    Convert {
        operand: Box<Expression>,
        ty: HostType,
    },
    /// Static call of a host method.
    Call {
        owner: String,
        method: String,
        args: Vec<Expression>,
        ty: HostType,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        ty: HostType,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        ty: HostType,
    },
    /// `operand`, or `fallback` when `operand` is null.
    Coalesce {
        operand: Box<Expression>,
        fallback: Box<Expression>,
    },
    /// Compiles, but fails with `message` whenever it is evaluated.
    Fail {
        message: String,
    },
}

impl Expression {
    pub fn constant(value: Value, ty: HostType) -> Self {
        Expression::Constant { value, ty }
    }

    pub fn convert(operand: Expression, ty: HostType) -> Self {
        Expression::Convert {
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression, ty: HostType) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expression, ty: HostType) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn coalesce(operand: Expression, fallback: Expression) -> Self {
        Expression::Coalesce {
            operand: Box::new(operand),
            fallback: Box::new(fallback),
        }
    }

    pub fn ty(&self) -> HostType {
        match self {
            Expression::Constant { ty, .. }
            | Expression::Parameter { ty, .. }
            | Expression::Convert { ty, .. }
            | Expression::Call { ty, .. }
            | Expression::Binary { ty, .. }
            | Expression::Unary { ty, .. } => *ty,
            Expression::Coalesce { fallback, .. } => fallback.ty(),
            Expression::Fail { .. } => HostType::boxed(HostKind::Object),
        }
    }

    /// Whether evaluating this expression always fails.
    pub fn is_fail(&self) -> bool {
        matches!(self, Expression::Fail { .. })
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant { value, .. } => match value {
                Value::Null => write!(f, "null"),
                Value::String(s) => write!(f, "{:?}", s),
                Value::Symbol { flag } => write!(f, "Flag.{}", flag.keyword()),
                other => write!(f, "{}", other),
            },
            Expression::Parameter { index, .. } => write!(f, "${}", index),
            Expression::Convert { operand, ty } => write!(f, "({}) {}", ty, operand),
            Expression::Call { owner, method, args, .. } => {
                write!(f, "{}.{}(", owner, method)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Binary { op, left, right, .. } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expression::Unary { op, operand, .. } => match op {
                UnaryOp::Negate => write!(f, "-{}", operand),
                UnaryOp::Not => write!(f, "!{}", operand),
                UnaryOp::IsNull => write!(f, "({} == null)", operand),
                UnaryOp::IsNotNull => write!(f, "({} != null)", operand),
            },
            Expression::Coalesce { operand, fallback } => write!(f, "coalesce({}, {})", operand, fallback),
            Expression::Fail { message } => write!(f, "fail({:?})", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_type_mapping() {
        assert_eq!(
            HostType::of(&SqlType::not_null(TypeName::Integer)),
            HostType::primitive(HostKind::Int)
        );
        assert_eq!(
            HostType::of(&SqlType::nullable(TypeName::BigInt)),
            HostType::boxed(HostKind::Long)
        );
        // Reference kinds are always nullable.
        assert!(HostType::of(&SqlType::not_null(TypeName::Varchar)).can_hold_null());
        assert!(!HostType::of(&SqlType::not_null(TypeName::Double)).can_hold_null());
    }

    #[test]
    fn test_display() {
        let e = Expression::binary(
            BinaryOp::Plus,
            Expression::convert(
                Expression::Parameter { index: 0, ty: HostType::boxed(HostKind::Int) },
                HostType::primitive(HostKind::Long),
            ),
            Expression::constant(Value::Int(1), HostType::primitive(HostKind::Int)),
            HostType::primitive(HostKind::Long),
        );
        assert_eq!(e.to_string(), "((long) $0 + 1)");

        let fail = Expression::Fail { message: "F: nope".into() };
        assert_eq!(fail.to_string(), "fail(\"F: nope\")");
    }
}
