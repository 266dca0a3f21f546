//! Operator descriptors
//!
//! A descriptor is immutable metadata for one operator: display name, kind,
//! how it is spelled, binding precedence, type rules and arity. Descriptors are
//! compared by identity ([`OperatorId`]), never by spelling: two operators may
//! both print as `/` and still be different operators.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::arity::ArityRange;
use crate::rules::{OperandTypeRule, ReturnTypeRule};
use crate::IrError;

/// Identity of an operator, independent of its rendered name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(String);

impl OperatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lets maps keyed by [`OperatorId`] be queried with a plain `&str`.
impl Borrow<str> for OperatorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperatorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlKind {
    // Arithmetic
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    MinusPrefix,

    // Comparison
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    And,
    Or,
    Not,

    // Null tests
    IsNull,
    IsNotNull,

    Trim,
    OtherFunction,
    Other,
}

/// How an operator is spelled in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Syntax {
    /// `a op b`
    Binary,
    /// `op a`
    Prefix,
    /// `a op`
    Postfix,
    /// `NAME(a, b)`
    Function,
    /// Bare `NAME`, a niladic function printed without parentheses
    FunctionId,
    /// `TRIM(BOTH chars FROM source)`
    Trim,
    /// `SUBSTRING(source FROM start FOR length)`
    Substring,
    /// `CASE WHEN a IS NULL THEN 1 ELSE 0 END`
    NullIndicator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct OperatorDescriptor {
    id: OperatorId,
    name: String,
    kind: SqlKind,
    syntax: Syntax,
    precedence: u32,
    left_assoc: bool,
    return_rule: ReturnTypeRule,
    operand_rule: OperandTypeRule,
    arity: ArityRange,
}

#[derive(Deserialize)]
struct RawDescriptor {
    id: OperatorId,
    name: String,
    kind: SqlKind,
    syntax: Syntax,
    precedence: u32,
    left_assoc: bool,
    return_rule: ReturnTypeRule,
    operand_rule: OperandTypeRule,
    arity: ArityRange,
}

impl TryFrom<RawDescriptor> for OperatorDescriptor {
    type Error = IrError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        OperatorDescriptor::builder(raw.id, raw.name, raw.kind)
            .syntax(raw.syntax)
            .precedence(raw.precedence, raw.left_assoc)
            .returns(raw.return_rule)
            .operands(raw.operand_rule)
            .arity(raw.arity)
            .build()
    }
}

impl OperatorDescriptor {
    pub fn builder(id: impl Into<OperatorId>, name: impl Into<String>, kind: SqlKind) -> OperatorBuilder {
        OperatorBuilder {
            id: id.into(),
            name: name.into(),
            kind,
            syntax: Syntax::Function,
            precedence: 0,
            left_assoc: true,
            return_rule: ReturnTypeRule::FirstOperand,
            operand_rule: OperandTypeRule::Any,
            arity: ArityRange::unbounded(),
        }
    }

    pub fn id(&self) -> &OperatorId {
        &self.id
    }

    /// Name as printed in SQL.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SqlKind {
        self.kind
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn left_assoc(&self) -> bool {
        self.left_assoc
    }

    pub fn return_rule(&self) -> ReturnTypeRule {
        self.return_rule
    }

    pub fn operand_rule(&self) -> OperandTypeRule {
        self.operand_rule
    }

    pub fn arity(&self) -> ArityRange {
        self.arity
    }

    /// Binding strength towards the operand on the left.
    pub fn left_prec(&self) -> u32 {
        self.precedence * 2 + u32::from(!self.left_assoc)
    }

    /// Binding strength towards the operand on the right.
    pub fn right_prec(&self) -> u32 {
        self.precedence * 2 + u32::from(self.left_assoc)
    }

    /// Checks the invariants tying `kind` to the type and arity rules.
    pub fn validate(&self) -> Result<(), IrError> {
        let inconsistent = |reason: &str| IrError::InconsistentKind {
            operator: self.id.to_string(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(inconsistent("operator name must not be empty"));
        }
        ArityRange::new(self.arity.lower_bound(), self.arity.upper_bound())?;
        match self.kind {
            SqlKind::Divide | SqlKind::Plus | SqlKind::Minus | SqlKind::Times | SqlKind::Mod
                if !self.operand_rule.accepts_numeric_or_temporal() =>
            {
                Err(inconsistent("arithmetic operators need a numeric-or-temporal operand rule"))
            }
            SqlKind::Trim if self.operand_rule != OperandTypeRule::Trim => {
                Err(inconsistent("TRIM operators need the trim operand rule"))
            }
            _ if self.operand_rule == OperandTypeRule::Niladic
                && self.arity != ArityRange::exactly(0) =>
            {
                Err(inconsistent("niladic operators take exactly zero operands"))
            }
            _ => Ok(()),
        }
    }
}

impl PartialEq for OperatorDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OperatorDescriptor {}

impl Hash for OperatorDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for OperatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub struct OperatorBuilder {
    id: OperatorId,
    name: String,
    kind: SqlKind,
    syntax: Syntax,
    precedence: u32,
    left_assoc: bool,
    return_rule: ReturnTypeRule,
    operand_rule: OperandTypeRule,
    arity: ArityRange,
}

impl OperatorBuilder {
    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn precedence(mut self, precedence: u32, left_assoc: bool) -> Self {
        self.precedence = precedence;
        self.left_assoc = left_assoc;
        self
    }

    pub fn returns(mut self, rule: ReturnTypeRule) -> Self {
        self.return_rule = rule;
        self
    }

    pub fn operands(mut self, rule: OperandTypeRule) -> Self {
        self.operand_rule = rule;
        self
    }

    pub fn arity(mut self, arity: ArityRange) -> Self {
        self.arity = arity;
        self
    }

    pub fn build(self) -> Result<OperatorDescriptor, IrError> {
        let op = OperatorDescriptor {
            id: self.id,
            name: self.name,
            kind: self.kind,
            syntax: self.syntax,
            precedence: self.precedence,
            left_assoc: self.left_assoc,
            return_rule: self.return_rule,
            operand_rule: self.operand_rule,
            arity: self.arity,
        };
        op.validate()?;
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeName;

    fn divide(id: &str) -> OperatorDescriptor {
        OperatorDescriptor::builder(id, "/", SqlKind::Divide)
            .syntax(Syntax::Binary)
            .precedence(60, true)
            .returns(ReturnTypeRule::LeastRestrictive)
            .operands(OperandTypeRule::Division)
            .arity(ArityRange::exactly(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_identity_not_spelling() {
        let a = divide("DIVIDE");
        let b = divide("DATETIME_DIVIDE");
        assert_eq!(a.name, b.name);
        assert_ne!(a, b);
        assert_eq!(a, divide("DIVIDE"));
    }

    #[test]
    fn test_precedence_bias() {
        let op = divide("DIVIDE");
        assert_eq!(op.left_prec(), 120);
        assert_eq!(op.right_prec(), 121);
    }

    #[test]
    fn test_divide_kind_requires_numeric_rule() {
        let err = OperatorDescriptor::builder("BAD_DIVIDE", "/", SqlKind::Divide)
            .syntax(Syntax::Binary)
            .operands(OperandTypeRule::Character)
            .arity(ArityRange::exactly(2))
            .build()
            .unwrap_err();
        assert!(matches!(err, IrError::InconsistentKind { .. }));
    }

    #[test]
    fn test_niladic_requires_zero_arity() {
        let err = OperatorDescriptor::builder("PI", "PI", SqlKind::OtherFunction)
            .returns(ReturnTypeRule::FixedNotNull(TypeName::Double))
            .operands(OperandTypeRule::Niladic)
            .arity(ArityRange::exactly(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, IrError::InconsistentKind { .. }));
    }
}
