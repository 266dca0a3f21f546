//! Dialect-aware SQL rendering
//!
//! [`SqlRenderer`] prints a rex tree as SQL text for one [`Dialect`]. Each
//! call goes through the same chain: operator override, TRIM rewrite,
//! SUBSTRING rewrite, then the generic precedence printer.

use sqlforge_ir::{
    CallNode, NullDirection, OperatorDescriptor, RexLiteral, RexNode, SortKey, SqlKind, Syntax,
    TrimFlag, Value,
};
use sqlforge_registry::{ids, OperatorTable};
use std::borrow::Cow;

use crate::dialect::{Dialect, Feature, LimitStyle, TrimStyle};
use crate::writer::SqlWriter;

/// Largest row count a MySQL-style `LIMIT offset, count` accepts.
const UNLIMITED_ROWS: &str = "18446744073709551615";

/// Characters escaped when a trim character is spliced into a regex.
const REGEX_SPECIAL: &[char] = &[
    '\\', '^', '$', '{', '}', '[', ']', '(', ')', '.', '*', '+', '?', '|', '<', '>', '-', '&', '%',
    '@',
];

pub struct SqlRenderer<'a> {
    dialect: &'a Dialect,
}

impl<'a> SqlRenderer<'a> {
    pub fn new(dialect: &'a Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        self.dialect
    }

    /// Renders `call` in a context whose neighbours bind with the given
    /// precedences. Pass `(0, 0)` at the top level.
    pub fn render_call(&self, call: &CallNode, left_prec: u32, right_prec: u32) -> String {
        let mut w = SqlWriter::new();
        self.unparse_call(&mut w, call, left_prec, right_prec);
        w.finish()
    }

    pub fn render_rex(&self, rex: &RexNode, left_prec: u32, right_prec: u32) -> String {
        let mut w = SqlWriter::new();
        self.unparse_rex(&mut w, rex, left_prec, right_prec);
        w.finish()
    }

    pub fn render_literal(&self, literal: &RexLiteral) -> String {
        match &literal.value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) if x.is_nan() => "CAST('NaN' AS DOUBLE)".to_string(),
            Value::Float(x) if x.is_infinite() && *x > 0.0 => "CAST('Infinity' AS DOUBLE)".to_string(),
            Value::Float(x) if x.is_infinite() => "CAST('-Infinity' AS DOUBLE)".to_string(),
            Value::Float(x) => format!("{:?}", x),
            Value::Symbol { flag } => flag.keyword().to_string(),
            Value::String(s) => {
                let quoted = quote_string(s);
                if literal.ty.name.is_datetime() {
                    format!("{} {}", literal.ty.name, quoted)
                } else {
                    quoted
                }
            }
        }
    }

    /// Quotes `name` with the dialect's quote character when it is not a
    /// plain identifier.
    pub fn quote_identifier<'n>(&self, name: &'n str) -> Cow<'n, str> {
        let Some(q) = self.dialect.identifier_quote() else {
            return Cow::Borrowed(name);
        };
        if is_plain_identifier(name) {
            return Cow::Borrowed(name);
        }
        let escaped = name.replace(q, &format!("{q}{q}"));
        Cow::Owned(format!("{q}{escaped}{q}"))
    }

    pub fn render_alias(&self, expr_sql: &str, alias: &str) -> String {
        let alias = self.quote_identifier(alias);
        if self.dialect.has(Feature::AliasWithAs) {
            format!("{} AS {}", expr_sql, alias)
        } else {
            format!("{} {}", expr_sql, alias)
        }
    }

    /// `ORDER BY` clause for `keys`, after null-direction emulation. Empty
    /// when there are no keys.
    pub fn render_order_by(&self, keys: &[SortKey]) -> String {
        let keys = self.dialect.emulate_order_by(keys);
        if keys.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = keys.iter().map(|k| self.render_sort_key(k)).collect();
        format!("ORDER BY {}", rendered.join(", "))
    }

    pub fn render_sort_key(&self, key: &SortKey) -> String {
        let mut w = SqlWriter::new();
        self.unparse_rex(&mut w, &key.expr, 0, 0);
        if key.is_descending() {
            w.keyword("DESC");
        }
        match key.nulls {
            NullDirection::First => w.keyword("NULLS FIRST"),
            NullDirection::Last => w.keyword("NULLS LAST"),
            NullDirection::Unspecified => {}
        }
        w.finish()
    }

    /// Single-clause LIMIT form of an OFFSET/FETCH pair, or `None` when the
    /// dialect takes `OFFSET .. FETCH ..` directly or nothing is limited.
    pub fn emulate_limit_offset(&self, offset: Option<&RexNode>, limit: Option<&RexNode>) -> Option<String> {
        if self.dialect.has(Feature::NativeOffsetFetch) {
            return None;
        }
        let offset = offset.map(|o| self.render_rex(o, 0, 0));
        let limit = limit.map(|l| self.render_rex(l, 0, 0));

        let clause = match (self.dialect.limit_style(), offset, limit) {
            (_, None, None) => return None,
            (_, None, Some(n)) => format!("LIMIT {}", n),
            (LimitStyle::LimitComma, Some(o), Some(n)) => format!("LIMIT {}, {}", o, n),
            (LimitStyle::LimitComma, Some(o), None) => format!("LIMIT {}, {}", o, UNLIMITED_ROWS),
            (LimitStyle::LimitOffset, Some(o), Some(n)) => format!("LIMIT {} OFFSET {}", n, o),
            (LimitStyle::LimitOffset, Some(o), None) => format!("OFFSET {}", o),
        };
        tracing::debug!(dialect = %self.dialect.product(), clause = %clause, "emulated offset/fetch");
        Some(clause)
    }

    /// Row-limiting clause in whatever form the dialect accepts.
    pub fn render_offset_fetch(&self, offset: Option<&RexNode>, limit: Option<&RexNode>) -> Option<String> {
        if !self.dialect.has(Feature::NativeOffsetFetch) {
            return self.emulate_limit_offset(offset, limit);
        }
        let mut parts = Vec::new();
        if let Some(o) = offset {
            parts.push(format!("OFFSET {} ROWS", self.render_rex(o, 0, 0)));
        }
        if let Some(n) = limit {
            parts.push(format!("FETCH NEXT {} ROWS ONLY", self.render_rex(n, 0, 0)));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    fn unparse_rex(&self, w: &mut SqlWriter, rex: &RexNode, left_prec: u32, right_prec: u32) {
        match rex {
            RexNode::Literal(lit) => w.literal(&self.render_literal(lit)),
            RexNode::InputRef { index, name, .. } => match name {
                Some(name) => w.identifier(&self.quote_identifier(name)),
                None => w.identifier(&format!("${}", index)),
            },
            RexNode::Call(call) => self.unparse_call(w, call, left_prec, right_prec),
        }
    }

    fn unparse_call(&self, w: &mut SqlWriter, call: &CallNode, left_prec: u32, right_prec: u32) {
        let substituted;
        let call = match self.dialect.operator_override(call.operator().id()) {
            Some(op) => match call.with_operator(op.clone()) {
                Ok(c) => {
                    tracing::debug!(
                        dialect = %self.dialect.product(),
                        from = %call.operator().id(),
                        to = %op.id(),
                        "substituting dialect operator"
                    );
                    substituted = c;
                    &substituted
                }
                Err(e) => {
                    tracing::warn!(operator = %call.operator().id(), error = %e, "dialect override does not fit call");
                    call
                }
            },
            None => call,
        };

        let op = call.operator();
        if op.kind() == SqlKind::Trim && call.operands().len() == 3 {
            self.unparse_trim(w, call);
        } else if op.kind() == SqlKind::OtherFunction
            && op.syntax() == Syntax::Substring
            && !self.dialect.has(Feature::SubstringFromFor)
        {
            self.unparse_function(w, op.name(), call.operands());
        } else {
            self.unparse_generic(w, call, left_prec, right_prec);
        }
    }

    fn unparse_generic(&self, w: &mut SqlWriter, call: &CallNode, left_prec: u32, right_prec: u32) {
        let op: &OperatorDescriptor = call.operator();
        match op.syntax() {
            Syntax::Function => self.unparse_function(w, op.name(), call.operands()),
            Syntax::FunctionId if call.operands().is_empty() => w.keyword(op.name()),
            Syntax::FunctionId => self.unparse_function(w, op.name(), call.operands()),
            Syntax::Trim => match call.operands() {
                [flag, chars, source] => self.unparse_standard_trim(w, op.name(), flag, chars, source),
                operands => self.unparse_function(w, op.name(), operands),
            },
            Syntax::Substring => {
                let frame = w.start_fun_call(op.name());
                for (i, operand) in call.operands().iter().enumerate() {
                    match i {
                        0 => {}
                        1 => w.keyword("FROM"),
                        _ => w.keyword("FOR"),
                    }
                    self.unparse_rex(w, operand, 0, 0);
                }
                w.end(frame);
            }
            Syntax::NullIndicator => self.unparse_null_indicator(w, call, left_prec, right_prec),
            Syntax::Binary | Syntax::Prefix | Syntax::Postfix => {
                if needs_parens(op.left_prec(), op.right_prec(), left_prec, right_prec) {
                    let frame = w.start_parens();
                    self.unparse_operator(w, call, 0, 0);
                    w.end(frame);
                } else {
                    self.unparse_operator(w, call, left_prec, right_prec);
                }
            }
        }
    }

    fn unparse_operator(&self, w: &mut SqlWriter, call: &CallNode, left_prec: u32, right_prec: u32) {
        let op = call.operator();
        let last = call.operands().len().saturating_sub(1);
        match op.syntax() {
            Syntax::Prefix => {
                w.keyword(op.name());
                for operand in call.operands() {
                    self.unparse_rex(w, operand, op.left_prec(), op.right_prec());
                }
            }
            Syntax::Postfix => {
                for operand in call.operands() {
                    self.unparse_rex(w, operand, left_prec, op.left_prec());
                }
                w.keyword(op.name());
            }
            _ => {
                for (i, operand) in call.operands().iter().enumerate() {
                    if i > 0 {
                        w.keyword(op.name());
                    }
                    let l = if i == 0 { left_prec } else { op.right_prec() };
                    let r = if i == last { right_prec } else { op.left_prec() };
                    self.unparse_rex(w, operand, l, r);
                }
            }
        }
    }

    fn unparse_function(&self, w: &mut SqlWriter, name: &str, operands: &[RexNode]) {
        let frame = w.start_fun_call(name);
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                w.sep();
            }
            self.unparse_rex(w, operand, 0, 0);
        }
        w.end(frame);
    }

    fn unparse_trim(&self, w: &mut SqlWriter, call: &CallNode) {
        let name = call.operator().name();
        let (flag, chars, source) = (&call.operands()[0], &call.operands()[1], &call.operands()[2]);
        let trim_flag = match flag.as_literal().map(|l| &l.value) {
            Some(Value::Symbol { flag }) => *flag,
            _ => TrimFlag::Both,
        };
        let function = match trim_flag {
            TrimFlag::Both => name,
            TrimFlag::Leading => "LTRIM",
            TrimFlag::Trailing => "RTRIM",
        };
        let chars_text = match chars.as_literal().map(|l| &l.value) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        };

        match (self.dialect.trim_style(), chars_text) {
            (TrimStyle::Standard, _) | (TrimStyle::FunctionCall, None) => {
                self.unparse_standard_trim(w, name, flag, chars, source)
            }
            (TrimStyle::FunctionCall, Some(text)) if is_whitespace(text) => {
                tracing::debug!(dialect = %self.dialect.product(), function, "trim rewritten as function call");
                self.unparse_function(w, function, std::slice::from_ref(source));
            }
            (TrimStyle::FunctionCall, Some(text)) => {
                let pattern = regexp_trim_pattern(text, trim_flag);
                tracing::debug!(dialect = %self.dialect.product(), pattern = %pattern, "trim rewritten as REGEXP_REPLACE");
                let frame = w.start_fun_call("REGEXP_REPLACE");
                self.unparse_rex(w, source, 0, 0);
                w.sep();
                w.literal(&quote_string(&pattern));
                w.sep();
                w.literal("''");
                w.end(frame);
            }
            (TrimStyle::SourceThenChars, text) => {
                tracing::debug!(dialect = %self.dialect.product(), function, "trim rewritten with source first");
                let frame = w.start_fun_call(function);
                self.unparse_rex(w, source, 0, 0);
                if !text.is_some_and(is_whitespace) {
                    w.sep();
                    self.unparse_rex(w, chars, 0, 0);
                }
                w.end(frame);
            }
        }
    }

    fn unparse_standard_trim(&self, w: &mut SqlWriter, name: &str, flag: &RexNode, chars: &RexNode, source: &RexNode) {
        let frame = w.start_fun_call(name);
        self.unparse_rex(w, flag, 0, 0);
        self.unparse_rex(w, chars, 0, 0);
        w.keyword("FROM");
        self.unparse_rex(w, source, 0, 0);
        w.end(frame);
    }

    fn unparse_null_indicator(&self, w: &mut SqlWriter, call: &CallNode, left_prec: u32, right_prec: u32) {
        let (is_null_left, is_null_right) = OperatorTable::standard()
            .get(ids::IS_NULL)
            .map_or((0, 0), |op| (op.left_prec(), op.right_prec()));
        let Some(operand) = call.operands().first() else {
            w.literal("0");
            return;
        };

        if self.dialect.has(Feature::BooleanSortKeys) {
            if needs_parens(is_null_left, is_null_right, left_prec, right_prec) {
                let frame = w.start_parens();
                self.unparse_rex(w, operand, 0, is_null_left);
                w.keyword("IS NULL");
                w.end(frame);
            } else {
                self.unparse_rex(w, operand, left_prec, is_null_left);
                w.keyword("IS NULL");
            }
        } else {
            w.keyword("CASE WHEN");
            self.unparse_rex(w, operand, 0, is_null_left);
            w.keyword("IS NULL THEN 1 ELSE 0 END");
        }
    }
}

fn needs_parens(op_left: u32, op_right: u32, left_prec: u32, right_prec: u32) -> bool {
    left_prec > op_left || (right_prec != 0 && op_right <= right_prec)
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_whitespace(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_whitespace)
}

fn escape_regex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if REGEX_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn regexp_trim_pattern(chars: &str, flag: TrimFlag) -> String {
    let c = escape_regex(chars);
    match flag {
        TrimFlag::Both => format!("^({c})*|({c})*$"),
        TrimFlag::Leading => format!("^({c})*"),
        TrimFlag::Trailing => format!("({c})*$"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles;
    use sqlforge_ir::{SqlType, TypeName};

    fn col(name: &str) -> RexNode {
        RexNode::input(0, name, SqlType::nullable(TypeName::Integer))
    }

    fn call(id: &str, operands: Vec<RexNode>) -> CallNode {
        CallNode::infer(OperatorTable::standard().require(id).unwrap(), operands).unwrap()
    }

    #[test]
    fn test_regex_escaping() {
        assert_eq!(escape_regex("a.b"), "a\\.b");
        assert_eq!(escape_regex("-"), "\\-");
        assert_eq!(regexp_trim_pattern("x", TrimFlag::Leading), "^(x)*");
        assert_eq!(regexp_trim_pattern("*", TrimFlag::Both), "^(\\*)*|(\\*)*$");
    }

    #[test]
    fn test_quote_identifier() {
        let ansi = profiles::ansi();
        let r = SqlRenderer::new(&ansi);
        assert_eq!(r.quote_identifier("amount"), "amount");
        assert_eq!(r.quote_identifier("order id"), "\"order id\"");
        assert_eq!(r.quote_identifier("a\"b"), "\"a\"\"b\"");

        let mysql = profiles::mysql(8, 0);
        assert_eq!(SqlRenderer::new(&mysql).quote_identifier("1st"), "`1st`");
    }

    #[test]
    fn test_literals() {
        let ansi = profiles::ansi();
        let r = SqlRenderer::new(&ansi);
        assert_eq!(r.render_rex(&RexNode::string("it's"), 0, 0), "'it''s'");
        assert_eq!(r.render_rex(&RexNode::null(TypeName::Integer), 0, 0), "NULL");
        assert_eq!(r.render_rex(&RexNode::symbol(TrimFlag::Leading), 0, 0), "LEADING");
        let date = RexNode::literal(Value::String("2024-01-31".into()), SqlType::not_null(TypeName::Date));
        assert_eq!(r.render_rex(&date, 0, 0), "DATE '2024-01-31'");
        let ts = RexNode::literal(Value::String("2024-01-31 10:00:00".into()), SqlType::not_null(TypeName::Timestamp));
        assert_eq!(r.render_rex(&ts, 0, 0), "TIMESTAMP '2024-01-31 10:00:00'");
    }

    #[test]
    fn test_non_finite_float_literals() {
        let ansi = profiles::ansi();
        let r = SqlRenderer::new(&ansi);
        let double = |x: f64| RexNode::literal(Value::Float(x), SqlType::not_null(TypeName::Double));
        assert_eq!(r.render_rex(&double(2.5), 0, 0), "2.5");
        assert_eq!(r.render_rex(&double(f64::NAN), 0, 0), "CAST('NaN' AS DOUBLE)");
        assert_eq!(r.render_rex(&double(f64::INFINITY), 0, 0), "CAST('Infinity' AS DOUBLE)");
        assert_eq!(r.render_rex(&double(f64::NEG_INFINITY), 0, 0), "CAST('-Infinity' AS DOUBLE)");
    }

    #[test]
    fn test_unnamed_input() {
        let ansi = profiles::ansi();
        let rex = RexNode::InputRef {
            index: 3,
            name: None,
            ty: SqlType::nullable(TypeName::Integer),
        };
        assert_eq!(SqlRenderer::new(&ansi).render_rex(&rex, 0, 0), "$3");
    }

    #[test]
    fn test_prefix_and_postfix() {
        let ansi = profiles::ansi();
        let r = SqlRenderer::new(&ansi);

        let sum = call(ids::PLUS, vec![col("a"), col("b")]);
        let neg = call(ids::UNARY_MINUS, vec![sum.into()]);
        assert_eq!(r.render_call(&neg, 0, 0), "- (a + b)");

        let and = call(ids::AND, vec![col("p"), col("q")]);
        let is_null = call(ids::IS_NULL, vec![and.into()]);
        assert_eq!(r.render_call(&is_null, 0, 0), "(p AND q) IS NULL");

        let eq = call(ids::EQUALS, vec![col("a"), col("b")]);
        let not = call(ids::NOT, vec![eq.into()]);
        assert_eq!(r.render_call(&not, 0, 0), "NOT a = b");
    }

    #[test]
    fn test_standard_trim() {
        let ansi = profiles::ansi();
        let trim = call(
            ids::TRIM,
            vec![RexNode::symbol(TrimFlag::Both), RexNode::string(" "), col("s")],
        );
        assert_eq!(SqlRenderer::new(&ansi).render_call(&trim, 0, 0), "TRIM(BOTH ' ' FROM s)");
    }

    #[test]
    fn test_source_then_chars_trim() {
        let bq = profiles::bigquery();
        let r = SqlRenderer::new(&bq);
        let leading = call(
            ids::TRIM,
            vec![RexNode::symbol(TrimFlag::Leading), RexNode::string("x"), col("s")],
        );
        assert_eq!(r.render_call(&leading, 0, 0), "LTRIM(s, 'x')");

        let spaces = call(
            ids::TRIM,
            vec![RexNode::symbol(TrimFlag::Both), RexNode::string(" "), col("s")],
        );
        assert_eq!(r.render_call(&spaces, 0, 0), "TRIM(s)");
    }

    #[test]
    fn test_alias() {
        let ansi = profiles::ansi();
        let hive = profiles::hive(2, 1);
        assert_eq!(SqlRenderer::new(&ansi).render_alias("a + b", "total"), "a + b AS total");
        assert_eq!(SqlRenderer::new(&hive).render_alias("a + b", "total"), "a + b total");
    }

    #[test]
    fn test_native_offset_fetch() {
        let ansi = profiles::ansi();
        let r = SqlRenderer::new(&ansi);
        assert_eq!(r.emulate_limit_offset(Some(&RexNode::int(5)), Some(&RexNode::int(10))), None);
        assert_eq!(
            r.render_offset_fetch(Some(&RexNode::int(5)), Some(&RexNode::int(10))).as_deref(),
            Some("OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY")
        );
        assert_eq!(r.render_offset_fetch(None, None), None);
    }

    #[test]
    fn test_limit_offset_style() {
        let pg = profiles::postgresql();
        let r = SqlRenderer::new(&pg);
        assert_eq!(
            r.emulate_limit_offset(Some(&RexNode::int(5)), Some(&RexNode::int(10))).as_deref(),
            Some("LIMIT 10 OFFSET 5")
        );
        assert_eq!(r.emulate_limit_offset(Some(&RexNode::int(5)), None).as_deref(), Some("OFFSET 5"));
        assert_eq!(r.emulate_limit_offset(None, None), None);
    }
}
