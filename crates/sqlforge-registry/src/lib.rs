//! Standard operator catalog
//!
//! The catalog is populated once at process start and then only read. Each
//! operator is stored under its identity; several operators may share a
//! display name (`/` is both `DIVIDE` and `DATETIME_DIVIDE`).

use sqlforge_ir::{
    ArityRange, IrError, OperandTypeRule, OperatorDescriptor, OperatorId, ReturnTypeRule, SqlKind,
    Syntax, TypeName,
};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

pub mod ids;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Operator not found: {0}")]
    OperatorNotFound(String),

    #[error("Operator {name} has no overload taking {count} operands")]
    NoMatchingArity { name: String, count: usize },

    #[error("Duplicate operator identity: {0}")]
    DuplicateOperator(String),

    #[error(transparent)]
    Ir(#[from] IrError),
}

static STANDARD: LazyLock<OperatorTable> =
    LazyLock::new(|| OperatorTable::with_builtins().expect("built-in operator catalog is consistent"));

#[derive(Debug, Default)]
pub struct OperatorTable {
    operators: HashMap<OperatorId, Arc<OperatorDescriptor>>,
    by_name: HashMap<String, Vec<OperatorId>>, // upper-cased name -> identities in registration order
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh catalog holding every built-in operator.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut table = Self::new();
        table.register_builtins()?;
        tracing::debug!(operators = table.len(), "built-in operator catalog registered");
        Ok(table)
    }

    /// The process-wide standard catalog.
    pub fn standard() -> &'static OperatorTable {
        &STANDARD
    }

    fn register_builtins(&mut self) -> Result<(), RegistryError> {
        // Logical
        self.register(binary(ids::OR, "OR", SqlKind::Or, 22, OperandTypeRule::Boolean, ReturnTypeRule::Boolean)?)?;
        self.register(binary(ids::AND, "AND", SqlKind::And, 24, OperandTypeRule::Boolean, ReturnTypeRule::Boolean)?)?;
        self.register(
            OperatorDescriptor::builder(ids::NOT, "NOT", SqlKind::Not)
                .syntax(Syntax::Prefix)
                .precedence(26, false)
                .returns(ReturnTypeRule::Boolean)
                .operands(OperandTypeRule::Boolean)
                .arity(ArityRange::exactly(1))
                .build()?,
        )?;

        // Null tests
        for (id, name, kind) in [
            (ids::IS_NULL, "IS NULL", SqlKind::IsNull),
            (ids::IS_NOT_NULL, "IS NOT NULL", SqlKind::IsNotNull),
        ] {
            self.register(
                OperatorDescriptor::builder(id, name, kind)
                    .syntax(Syntax::Postfix)
                    .precedence(28, true)
                    .returns(ReturnTypeRule::BooleanNotNull)
                    .operands(OperandTypeRule::Any)
                    .arity(ArityRange::exactly(1))
                    .build()?,
            )?;
        }

        // Comparison
        for (id, name, kind) in [
            (ids::EQUALS, "=", SqlKind::Equals),
            (ids::NOT_EQUALS, "<>", SqlKind::NotEquals),
            (ids::LESS_THAN, "<", SqlKind::LessThan),
            (ids::LESS_THAN_OR_EQUAL, "<=", SqlKind::LessThanOrEqual),
            (ids::GREATER_THAN, ">", SqlKind::GreaterThan),
            (ids::GREATER_THAN_OR_EQUAL, ">=", SqlKind::GreaterThanOrEqual),
        ] {
            self.register(binary(id, name, kind, 30, OperandTypeRule::Comparable, ReturnTypeRule::Boolean)?)?;
        }

        // Arithmetic
        self.register(binary(ids::PLUS, "+", SqlKind::Plus, 40, OperandTypeRule::NumericOrInterval, ReturnTypeRule::LeastRestrictive)?)?;
        self.register(binary(ids::MINUS, "-", SqlKind::Minus, 40, OperandTypeRule::NumericOrInterval, ReturnTypeRule::LeastRestrictive)?)?;
        self.register(binary(ids::TIMES, "*", SqlKind::Times, 60, OperandTypeRule::NumericOrInterval, ReturnTypeRule::LeastRestrictive)?)?;
        self.register(binary(ids::DIVIDE, "/", SqlKind::Divide, 60, OperandTypeRule::Division, ReturnTypeRule::LeastRestrictive)?)?;
        self.register(binary(ids::MOD, "%", SqlKind::Mod, 60, OperandTypeRule::Numeric, ReturnTypeRule::LeastRestrictive)?)?;
        // Registered after DIVIDE so that name lookups of "/" keep resolving to
        // ordinary division; this one is only reachable by identity.
        self.register(datetime_divide()?)?;
        self.register(
            OperatorDescriptor::builder(ids::UNARY_MINUS, "-", SqlKind::MinusPrefix)
                .syntax(Syntax::Prefix)
                .precedence(80, false)
                .returns(ReturnTypeRule::FirstOperand)
                .operands(OperandTypeRule::NumericOrInterval)
                .arity(ArityRange::exactly(1))
                .build()?,
        )?;

        // String functions
        self.register(
            OperatorDescriptor::builder(ids::TRIM, "TRIM", SqlKind::Trim)
                .syntax(Syntax::Trim)
                .returns(ReturnTypeRule::Fixed(TypeName::Varchar))
                .operands(OperandTypeRule::Trim)
                .arity(ArityRange::exactly(3))
                .build()?,
        )?;
        self.register(
            OperatorDescriptor::builder(ids::SUBSTRING, "SUBSTRING", SqlKind::OtherFunction)
                .syntax(Syntax::Substring)
                .returns(ReturnTypeRule::FirstOperand)
                .operands(OperandTypeRule::Substring)
                .arity(ArityRange::between(2, 3))
                .build()?,
        )?;
        for (id, name) in [(ids::UPPER, "UPPER"), (ids::LOWER, "LOWER")] {
            self.register(
                OperatorDescriptor::builder(id, name, SqlKind::OtherFunction)
                    .returns(ReturnTypeRule::FirstOperand)
                    .operands(OperandTypeRule::Character)
                    .arity(ArityRange::exactly(1))
                    .build()?,
            )?;
        }
        self.register(
            OperatorDescriptor::builder(ids::CHAR_LENGTH, "CHAR_LENGTH", SqlKind::OtherFunction)
                .returns(ReturnTypeRule::Fixed(TypeName::Integer))
                .operands(OperandTypeRule::Character)
                .arity(ArityRange::exactly(1))
                .build()?,
        )?;

        // Numeric functions
        self.register(
            OperatorDescriptor::builder(ids::ABS, "ABS", SqlKind::OtherFunction)
                .returns(ReturnTypeRule::FirstOperand)
                .operands(OperandTypeRule::NumericOrInterval)
                .arity(ArityRange::exactly(1))
                .build()?,
        )?;
        self.register(
            OperatorDescriptor::builder(ids::PI, "PI", SqlKind::OtherFunction)
                .syntax(Syntax::FunctionId)
                .returns(ReturnTypeRule::FixedNotNull(TypeName::Double))
                .operands(OperandTypeRule::Niladic)
                .arity(ArityRange::exactly(0))
                .build()?,
        )?;

        // Sort-key helper synthesized by null-ordering emulation
        self.register(
            OperatorDescriptor::builder(ids::NULL_INDICATOR, "NULL_INDICATOR", SqlKind::Other)
                .syntax(Syntax::NullIndicator)
                .returns(ReturnTypeRule::FixedNotNull(TypeName::Integer))
                .operands(OperandTypeRule::Any)
                .arity(ArityRange::exactly(1))
                .build()?,
        )?;

        Ok(())
    }

    pub fn register(&mut self, op: OperatorDescriptor) -> Result<Arc<OperatorDescriptor>, RegistryError> {
        op.validate()?;
        if self.operators.contains_key(op.id()) {
            return Err(RegistryError::DuplicateOperator(op.id().to_string()));
        }
        let op = Arc::new(op);
        self.by_name
            .entry(op.name().to_uppercase())
            .or_default()
            .push(op.id().clone());
        self.operators.insert(op.id().clone(), Arc::clone(&op));
        Ok(op)
    }

    /// Looks up an operator by identity. Takes an [`OperatorId`] or one of
    /// the [`ids`] constants.
    pub fn get<Q>(&self, id: &Q) -> Option<Arc<OperatorDescriptor>>
    where
        OperatorId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.operators.get(id).cloned()
    }

    pub fn require<Q>(&self, id: &Q) -> Result<Arc<OperatorDescriptor>, RegistryError>
    where
        OperatorId: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        self.get(id)
            .ok_or_else(|| RegistryError::OperatorNotFound(id.to_string()))
    }

    /// First operator registered under `name` (case-insensitive).
    pub fn lookup_name(&self, name: &str) -> Result<Arc<OperatorDescriptor>, RegistryError> {
        self.by_name
            .get(&name.to_uppercase())
            .and_then(|ids| ids.first())
            .and_then(|id| self.operators.get(id))
            .cloned()
            .ok_or_else(|| RegistryError::OperatorNotFound(name.to_string()))
    }

    /// First operator registered under `name` whose arity admits `count` operands.
    pub fn lookup_name_arity(&self, name: &str, count: usize) -> Result<Arc<OperatorDescriptor>, RegistryError> {
        let ids = self
            .by_name
            .get(&name.to_uppercase())
            .ok_or_else(|| RegistryError::OperatorNotFound(name.to_string()))?;

        ids.iter()
            .filter_map(|id| self.operators.get(id))
            .find(|op| op.arity().is_valid_count(count))
            .cloned()
            .ok_or_else(|| RegistryError::NoMatchingArity {
                name: name.to_string(),
                count,
            })
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<OperatorDescriptor>> {
        self.operators.values()
    }
}

fn binary(
    id: &str,
    name: &str,
    kind: SqlKind,
    precedence: u32,
    operands: OperandTypeRule,
    returns: ReturnTypeRule,
) -> Result<OperatorDescriptor, IrError> {
    OperatorDescriptor::builder(id, name, kind)
        .syntax(Syntax::Binary)
        .precedence(precedence, true)
        .returns(returns)
        .operands(operands)
        .arity(ArityRange::exactly(2))
        .build()
}

/// Division of a timestamp difference.
///
/// Prints exactly like `/` and accepts the same operands, but always returns
/// BIGINT so that downstream consumers can tell it apart from ordinary
/// division (by identity) and keep the result integral.
pub fn datetime_divide() -> Result<OperatorDescriptor, IrError> {
    OperatorDescriptor::builder(ids::DATETIME_DIVIDE, "/", SqlKind::Divide)
        .syntax(Syntax::Binary)
        .precedence(60, true)
        .returns(ReturnTypeRule::Fixed(TypeName::BigInt))
        .operands(OperandTypeRule::Division)
        .arity(ArityRange::exactly(2))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlforge_ir::SqlType;

    #[test]
    fn test_builtin_lookup() {
        let table = OperatorTable::standard();

        let op = table.lookup_name("substring").unwrap();
        assert_eq!(op.id().as_str(), ids::SUBSTRING);
        assert_eq!(op.kind(), SqlKind::OtherFunction);
        assert!(table.get("NO_SUCH_OPERATOR").is_none());
    }

    #[test]
    fn test_get_by_typed_id() {
        let table = OperatorTable::standard();
        let id = OperatorId::new(ids::DATETIME_DIVIDE);
        let op = table.get(&id).unwrap();
        assert_eq!(op.id(), &id);
        assert_eq!(table.require(&id).unwrap(), op);
        assert!(matches!(
            table.require(&OperatorId::new("NO_SUCH_OPERATOR")),
            Err(RegistryError::OperatorNotFound(name)) if name == "NO_SUCH_OPERATOR"
        ));
    }

    #[test]
    fn test_with_builtins_matches_standard() {
        let fresh = OperatorTable::with_builtins().unwrap();
        assert_eq!(fresh.len(), OperatorTable::standard().len());
        assert!(fresh.get(ids::PI).is_some());
    }

    #[test]
    fn test_slash_resolves_to_plain_division() {
        let table = OperatorTable::standard();

        let by_name = table.lookup_name("/").unwrap();
        assert_eq!(by_name.id().as_str(), ids::DIVIDE);
        assert_ne!(by_name, table.require(ids::DATETIME_DIVIDE).unwrap());
    }

    #[test]
    fn test_datetime_divide_contract() {
        let table = OperatorTable::standard();
        let plain = table.require(ids::DIVIDE).unwrap();
        let special = table.require(ids::DATETIME_DIVIDE).unwrap();

        assert_eq!(plain.name(), special.name());
        assert_eq!(plain.precedence(), special.precedence());
        assert_eq!(plain.operand_rule(), special.operand_rule());

        let operands = [SqlType::not_null(TypeName::Double), SqlType::not_null(TypeName::Integer)];
        assert_eq!(plain.return_rule().infer(&operands).name, TypeName::Double);
        assert_eq!(special.return_rule().infer(&operands).name, TypeName::BigInt);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut table = OperatorTable::new();
        table.register(datetime_divide().unwrap()).unwrap();
        let err = table.register(datetime_divide().unwrap()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateOperator(_)));
    }

    #[test]
    fn test_lookup_by_arity() {
        let table = OperatorTable::standard();
        assert!(table.lookup_name_arity("SUBSTRING", 3).is_ok());
        assert!(matches!(
            table.lookup_name_arity("SUBSTRING", 1),
            Err(RegistryError::NoMatchingArity { .. })
        ));
    }
}
