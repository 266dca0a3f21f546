//! SQLForge Intermediate Representation (IR)
//!
//! The dialect-neutral model shared by the SQL renderer and the in-process
//! code generator: operand-count contracts, operator descriptors, SQL types
//! and fully typed row expressions. Everything here is immutable once built
//! and safe to share across concurrent compilations.

use thiserror::Error;

mod arity;
mod operator;
mod rex;
mod rules;
mod types;

pub use arity::ArityRange;
pub use operator::{OperatorBuilder, OperatorDescriptor, OperatorId, SqlKind, Syntax};
pub use rex::{CallNode, Direction, NullDirection, RexLiteral, RexNode, SortKey, TrimFlag, Value};
pub use rules::{OperandTypeRule, ReturnTypeRule};
pub use types::{SqlType, TypeName};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("Operator {operator} called with {count} operands, expected between {min} and {max} (-1 = unbounded)")]
    Arity {
        operator: String,
        count: usize,
        min: i32,
        max: i32,
    },

    #[error("Invalid arity range: min {min}, max {max}")]
    InvalidArity { min: i32, max: i32 },

    #[error("Operator {operator} is inconsistent with its kind: {reason}")]
    InconsistentKind { operator: String, reason: String },

    #[error("Operator {operator} does not accept operand types {types:?}")]
    OperandTypes { operator: String, types: Vec<String> },
}
