//! Lowering of operator calls to executable host expressions
//!
//! Each operator identity maps to a [`CallImplementor`]. Operators without one
//! still lower: they become an expression that fails when evaluated, so a plan
//! referencing them compiles and only errors if that code path actually runs.

use thiserror::Error;

mod eval;
mod expression;
mod implementor;
mod method;
mod registry;
mod translator;

pub use eval::evaluate;
pub use expression::{BinaryOp, Expression, HostKind, HostType, UnaryOp};
pub use implementor::{
    BinaryImplementor, CallImplementor, DatetimeDivideImplementor, FallbackImplementor, IsNullImplementor,
    MethodNameImplementor, NullAs, UnaryImplementor,
};
pub use method::{HostFn, HostMethod, MethodTable, SQL_FUNCTIONS};
pub use registry::ImplementorRegistry;
pub use translator::Translator;

/// Failures while lowering. These are programming errors in how an
/// implementor was bound, not data errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("Method not found: {owner}.{method}")]
    MethodNotFound { owner: String, method: String },

    #[error("No overload of {owner}.{method} takes {count} arguments")]
    ArgumentCount {
        owner: String,
        method: String,
        count: usize,
    },

    #[error("Operator {operator} expects {expected} operands, got {count}")]
    OperandCount {
        operator: String,
        expected: usize,
        count: usize,
    },
}

/// Failures while evaluating a lowered expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("{0}")]
    UnimplementedOperator(String),

    #[error("Cannot convert null to {0}")]
    NullConversion(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Method not found: {owner}.{method}")]
    MethodNotFound { owner: String, method: String },

    #[error("Row has no field {0}")]
    MissingParameter(usize),

    #[error("Method failed: {0}")]
    Method(String),
}
