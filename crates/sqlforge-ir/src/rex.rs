//! Row expressions
//!
//! A [`RexNode`] tree is built once by the optimizer and then only read.
//! [`CallNode`] is the typed operator invocation consumed by both the dialect
//! renderer and the implementor registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::operator::{OperatorDescriptor, OperatorId};
use crate::types::{SqlType, TypeName};
use crate::IrError;

/// Flag operand of TRIM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrimFlag {
    Both,
    Leading,
    Trailing,
}

impl TrimFlag {
    pub fn keyword(&self) -> &'static str {
        match self {
            TrimFlag::Both => "BOTH",
            TrimFlag::Leading => "LEADING",
            TrimFlag::Trailing => "TRAILING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Symbol { flag: TrimFlag },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Symbol { flag } => write!(f, "{}", flag.keyword()),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RexLiteral {
    pub value: Value,
    pub ty: SqlType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RexNode {
    Literal(RexLiteral),
    InputRef {
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        ty: SqlType,
    },
    Call(CallNode),
}

impl RexNode {
    pub fn literal(value: Value, ty: SqlType) -> Self {
        RexNode::Literal(RexLiteral { value, ty })
    }

    pub fn int(i: i64) -> Self {
        Self::literal(Value::Int(i), SqlType::not_null(TypeName::Integer))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::literal(Value::String(s.into()), SqlType::not_null(TypeName::Varchar))
    }

    pub fn symbol(flag: TrimFlag) -> Self {
        Self::literal(Value::Symbol { flag }, SqlType::not_null(TypeName::Symbol))
    }

    pub fn null(ty: TypeName) -> Self {
        Self::literal(Value::Null, SqlType::nullable(ty))
    }

    pub fn input(index: usize, name: impl Into<String>, ty: SqlType) -> Self {
        RexNode::InputRef {
            index,
            name: Some(name.into()),
            ty,
        }
    }

    pub fn ty(&self) -> SqlType {
        match self {
            RexNode::Literal(lit) => lit.ty,
            RexNode::InputRef { ty, .. } => *ty,
            RexNode::Call(call) => call.result_type(),
        }
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match self {
            RexNode::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&RexLiteral> {
        match self {
            RexNode::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Whether this node is a call to the operator with the given identity.
    pub fn is_call_to(&self, id: &OperatorId) -> bool {
        self.as_call().is_some_and(|call| call.operator().id() == id)
    }
}

impl From<CallNode> for RexNode {
    fn from(call: CallNode) -> Self {
        RexNode::Call(call)
    }
}

/// An immutable, typed invocation of an operator.
///
/// Every construction path, deserialization included, enforces the
/// operator's arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCallNode")]
pub struct CallNode {
    operator: Arc<OperatorDescriptor>,
    operands: Vec<RexNode>,
    result_type: SqlType,
}

#[derive(Deserialize)]
struct RawCallNode {
    operator: Arc<OperatorDescriptor>,
    operands: Vec<RexNode>,
    result_type: SqlType,
}

impl TryFrom<RawCallNode> for CallNode {
    type Error = IrError;

    fn try_from(raw: RawCallNode) -> Result<Self, Self::Error> {
        CallNode::new(raw.operator, raw.operands, raw.result_type)
    }
}

impl CallNode {
    /// Builds a call, rejecting operand counts outside the operator's arity.
    pub fn new(
        operator: Arc<OperatorDescriptor>,
        operands: Vec<RexNode>,
        result_type: SqlType,
    ) -> Result<Self, IrError> {
        let arity = operator.arity();
        if !arity.is_valid_count(operands.len()) {
            return Err(IrError::Arity {
                operator: operator.id().to_string(),
                count: operands.len(),
                min: arity.lower_bound(),
                max: arity.upper_bound(),
            });
        }
        Ok(Self {
            operator,
            operands,
            result_type,
        })
    }

    /// Builds a call whose result type comes from the operator's return rule.
    pub fn infer(operator: Arc<OperatorDescriptor>, operands: Vec<RexNode>) -> Result<Self, IrError> {
        let types: Vec<SqlType> = operands.iter().map(RexNode::ty).collect();
        let result_type = operator.return_rule().infer(&types);
        Self::new(operator, operands, result_type)
    }

    /// A new call with the same operands bound to a different operator.
    pub fn with_operator(&self, operator: Arc<OperatorDescriptor>) -> Result<Self, IrError> {
        Self::new(operator, self.operands.clone(), self.result_type)
    }

    pub fn operator(&self) -> &Arc<OperatorDescriptor> {
        &self.operator
    }

    pub fn operands(&self) -> &[RexNode] {
        &self.operands
    }

    pub fn result_type(&self) -> SqlType {
        self.result_type
    }

    pub fn operand(&self, index: usize) -> Option<&RexNode> {
        self.operands.get(index)
    }

    pub fn operand_types(&self) -> Vec<SqlType> {
        self.operands.iter().map(RexNode::ty).collect()
    }

    pub fn check_operand_types(&self) -> Result<(), IrError> {
        let types = self.operand_types();
        if self.operator.operand_rule().check(&types) {
            Ok(())
        } else {
            Err(IrError::OperandTypes {
                operator: self.operator.id().to_string(),
                types: types.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullDirection {
    First,
    Last,
    Unspecified,
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub expr: RexNode,
    pub direction: Direction,
    pub nulls: NullDirection,
}

impl SortKey {
    pub fn new(expr: RexNode, direction: Direction, nulls: NullDirection) -> Self {
        Self { expr, direction, nulls }
    }

    pub fn asc(expr: RexNode) -> Self {
        Self::new(expr, Direction::Asc, NullDirection::Unspecified)
    }

    pub fn desc(expr: RexNode) -> Self {
        Self::new(expr, Direction::Desc, NullDirection::Unspecified)
    }

    pub fn nulls_first(self) -> Self {
        Self {
            nulls: NullDirection::First,
            ..self
        }
    }

    pub fn nulls_last(self) -> Self {
        Self {
            nulls: NullDirection::Last,
            ..self
        }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Desc
    }
}
