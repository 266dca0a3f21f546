//! JSON expression documents
//!
//! ```json
//! {"op": "SUBSTRING", "operands": [
//!     {"input": 0, "name": "s", "type": "VARCHAR"},
//!     {"literal": 2, "type": "INTEGER"}
//! ]}
//! ```
//!
//! `op` is an operator identity (`DATETIME_DIVIDE`) or a display name
//! (`/`, `substring`); names are resolved by operand count.

use serde::Deserialize;
use sqlforge_ir::{CallNode, IrError, RexNode, SqlType, TrimFlag, TypeName, Value};
use sqlforge_registry::{OperatorTable, RegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("Invalid literal {value} for type {ty}")]
    InvalidLiteral { value: String, ty: TypeName },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExprDocument {
    Call {
        op: String,
        #[serde(default)]
        operands: Vec<ExprDocument>,
    },
    Input {
        input: usize,
        #[serde(default)]
        name: Option<String>,
        #[serde(rename = "type")]
        ty: TypeName,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Literal {
        literal: serde_json::Value,
        #[serde(rename = "type")]
        ty: TypeName,
    },
}

fn default_nullable() -> bool {
    true
}

impl ExprDocument {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolves operators against `table` and builds the rex tree.
    pub fn resolve(&self, table: &OperatorTable) -> Result<RexNode, DocumentError> {
        match self {
            ExprDocument::Call { op, operands } => {
                let operands = operands
                    .iter()
                    .map(|doc| doc.resolve(table))
                    .collect::<Result<Vec<_>, _>>()?;
                let operator = match table.get(op.as_str()) {
                    Some(operator) => operator,
                    None => table.lookup_name_arity(op, operands.len())?,
                };
                let call = CallNode::infer(operator, operands)?;
                call.check_operand_types()?;
                tracing::debug!(operator = %call.operator().id(), result = %call.result_type(), "resolved call");
                Ok(RexNode::Call(call))
            }
            ExprDocument::Input { input, name, ty, nullable } => Ok(RexNode::InputRef {
                index: *input,
                name: name.clone(),
                ty: SqlType::new(*ty, *nullable),
            }),
            ExprDocument::Literal { literal, ty } => {
                let value = json_to_value(literal, *ty)?;
                let nullable = value.is_null();
                Ok(RexNode::literal(value, SqlType::new(*ty, nullable)))
            }
        }
    }
}

/// Parses a JSON array into one input row.
pub fn parse_row(text: &str) -> Result<Vec<Value>, DocumentError> {
    let cells: Vec<serde_json::Value> = serde_json::from_str(text)?;
    cells.iter().map(|cell| json_to_value(cell, TypeName::Any)).collect()
}

fn json_to_value(json: &serde_json::Value, ty: TypeName) -> Result<Value, DocumentError> {
    let invalid = || DocumentError::InvalidLiteral {
        value: json.to_string(),
        ty,
    };
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n.as_f64().map(Value::Float).ok_or_else(invalid),
        },
        serde_json::Value::String(_) if ty == TypeName::Symbol => {
            let flag: TrimFlag = serde_json::from_value(json.clone()).map_err(|_| invalid())?;
            Ok(Value::Symbol { flag })
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlforge_registry::ids;

    #[test]
    fn test_resolve_substring() {
        let doc = ExprDocument::parse(
            r#"{"op": "SUBSTRING", "operands": [
                {"input": 0, "name": "s", "type": "VARCHAR"},
                {"literal": 2, "type": "INTEGER"}]}"#,
        )
        .unwrap();
        let rex = doc.resolve(OperatorTable::standard()).unwrap();
        let call = rex.as_call().unwrap();
        assert_eq!(call.operator().id().as_str(), ids::SUBSTRING);
        assert_eq!(call.operands().len(), 2);
    }

    #[test]
    fn test_resolve_by_name_and_arity() {
        let doc = ExprDocument::parse(r#"{"op": "-", "operands": [{"literal": 3, "type": "INTEGER"}]}"#).unwrap();
        let rex = doc.resolve(OperatorTable::standard()).unwrap();
        assert!(rex.is_call_to(&ids::UNARY_MINUS.into()));
    }

    #[test]
    fn test_arity_error_reported() {
        let doc = ExprDocument::parse(r#"{"op": "SUBSTRING", "operands": [{"literal": "x", "type": "VARCHAR"}]}"#).unwrap();
        let err = doc.resolve(OperatorTable::standard()).unwrap_err();
        assert!(matches!(err, DocumentError::Ir(IrError::Arity { count: 1, min: 2, max: 3, .. })));
    }

    #[test]
    fn test_symbol_literal() {
        let doc = ExprDocument::parse(
            r#"{"op": "TRIM", "operands": [
                {"literal": "LEADING", "type": "SYMBOL"},
                {"literal": " ", "type": "VARCHAR"},
                {"input": 0, "name": "s", "type": "VARCHAR"}]}"#,
        )
        .unwrap();
        let rex = doc.resolve(OperatorTable::standard()).unwrap();
        let flag = rex.as_call().unwrap().operands()[0].as_literal().unwrap();
        assert_eq!(flag.value, Value::Symbol { flag: TrimFlag::Leading });
    }

    #[test]
    fn test_parse_row() {
        let row = parse_row(r#"[1, "abc", null, 2.5, true]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Value::Int(1),
                Value::String("abc".into()),
                Value::Null,
                Value::Float(2.5),
                Value::Bool(true)
            ]
        );
        assert!(parse_row("[[1]]").is_err());
    }
}
