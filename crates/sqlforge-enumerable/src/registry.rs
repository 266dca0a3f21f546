//! Operator identity to implementor mapping

use sqlforge_ir::OperatorId;
use sqlforge_registry::ids;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::expression::{BinaryOp, UnaryOp};
use crate::implementor::{
    BinaryImplementor, CallImplementor, DatetimeDivideImplementor, FallbackImplementor, IsNullImplementor,
    MethodNameImplementor, UnaryImplementor,
};
use crate::method::SQL_FUNCTIONS;

static FALLBACK: LazyLock<Arc<dyn CallImplementor>> = LazyLock::new(|| Arc::new(FallbackImplementor));

static STANDARD: LazyLock<ImplementorRegistry> = LazyLock::new(ImplementorRegistry::with_builtins);

#[derive(Default, Clone)]
pub struct ImplementorRegistry {
    implementors: HashMap<OperatorId, Arc<dyn CallImplementor>>,
}

impl ImplementorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Implementors for the standard operator catalog.
    pub fn standard() -> &'static ImplementorRegistry {
        &STANDARD
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        let binaries = [
            (ids::PLUS, BinaryOp::Plus),
            (ids::MINUS, BinaryOp::Minus),
            (ids::TIMES, BinaryOp::Times),
            (ids::DIVIDE, BinaryOp::Divide),
            (ids::MOD, BinaryOp::Mod),
            (ids::EQUALS, BinaryOp::Equal),
            (ids::NOT_EQUALS, BinaryOp::NotEqual),
            (ids::LESS_THAN, BinaryOp::LessThan),
            (ids::LESS_THAN_OR_EQUAL, BinaryOp::LessThanOrEqual),
            (ids::GREATER_THAN, BinaryOp::GreaterThan),
            (ids::GREATER_THAN_OR_EQUAL, BinaryOp::GreaterThanOrEqual),
            (ids::AND, BinaryOp::AndAlso),
            (ids::OR, BinaryOp::OrElse),
        ];
        for (id, op) in binaries {
            registry.register(id, Arc::new(BinaryImplementor::new(op)));
        }
        registry.register(ids::DATETIME_DIVIDE, Arc::new(DatetimeDivideImplementor));

        registry.register(ids::NOT, Arc::new(UnaryImplementor::new(UnaryOp::Not)));
        registry.register(ids::UNARY_MINUS, Arc::new(UnaryImplementor::new(UnaryOp::Negate)));
        registry.register(ids::IS_NULL, Arc::new(IsNullImplementor::is_null()));
        registry.register(ids::IS_NOT_NULL, Arc::new(IsNullImplementor::is_not_null()));

        let methods = [
            (ids::UPPER, "upper"),
            (ids::LOWER, "lower"),
            (ids::CHAR_LENGTH, "charLength"),
            (ids::SUBSTRING, "substring"),
            (ids::TRIM, "trim"),
            (ids::ABS, "abs"),
            (ids::PI, "pi"),
            (ids::NULL_INDICATOR, "nullIndicator"),
        ];
        for (id, method) in methods {
            registry.register(id, Arc::new(MethodNameImplementor::new(SQL_FUNCTIONS, method)));
        }

        registry
    }

    /// Binds an implementor to an operator identity, returning the one it
    /// replaces.
    pub fn register(
        &mut self,
        id: impl Into<OperatorId>,
        implementor: Arc<dyn CallImplementor>,
    ) -> Option<Arc<dyn CallImplementor>> {
        self.implementors.insert(id.into(), implementor)
    }

    /// The implementor for `id`; operators without one get the fallback.
    pub fn lookup(&self, id: &OperatorId) -> Arc<dyn CallImplementor> {
        match self.implementors.get(id) {
            Some(implementor) => Arc::clone(implementor),
            None => {
                tracing::trace!(operator = %id, "falling back to empty implementor");
                Arc::clone(&FALLBACK)
            }
        }
    }

    pub fn contains(&self, id: &OperatorId) -> bool {
        self.implementors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.implementors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementors.is_empty()
    }
}

impl std::fmt::Debug for ImplementorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.implementors.keys().map(OperatorId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("ImplementorRegistry").field("operators", &ids).finish()
    }
}
