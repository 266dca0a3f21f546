//! Per-operator lowering strategies

use sqlforge_ir::CallNode;

use crate::expression::{BinaryOp, Expression, HostKind, HostType, UnaryOp};
use crate::translator::Translator;
use crate::CodegenError;

/// How a null result of the expression being lowered is to be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullAs {
    /// Nulls flow through as nulls.
    #[default]
    Null,
    /// The caller guarantees the value is never null.
    NotPossible,
    /// A null result reads as FALSE.
    False,
    /// A null result reads as TRUE.
    True,
}

/// Lowers calls to one operator into host expressions.
pub trait CallImplementor: Send + Sync {
    fn implement(&self, translator: &Translator<'_>, call: &CallNode, null_as: NullAs)
        -> Result<Expression, CodegenError>;
}

/// Lowers a call to a static host method `owner.method`, one argument per
/// operand in operand order.
#[derive(Debug, Clone)]
pub struct MethodNameImplementor {
    owner: String,
    method: String,
}

impl MethodNameImplementor {
    pub fn new(owner: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            method: method.into(),
        }
    }
}

impl CallImplementor for MethodNameImplementor {
    fn implement(
        &self,
        translator: &Translator<'_>,
        call: &CallNode,
        null_as: NullAs,
    ) -> Result<Expression, CodegenError> {
        let methods = translator.methods();
        if !methods.contains(&self.owner, &self.method) {
            return Err(CodegenError::MethodNotFound {
                owner: self.owner.clone(),
                method: self.method.clone(),
            });
        }
        let signature = methods
            .resolve(&self.owner, &self.method, call.operands().len())
            .ok_or_else(|| CodegenError::ArgumentCount {
                owner: self.owner.clone(),
                method: self.method.clone(),
                count: call.operands().len(),
            })?;

        let mut args = Vec::with_capacity(call.operands().len());
        for (operand, param) in call.operands().iter().zip(&signature.params) {
            let nullified = HostType::of(&operand.ty().nullify());
            let mut arg = Expression::convert(translator.translate(operand, null_as)?, nullified);
            if nullified != *param {
                arg = Expression::convert(arg, *param);
            }
            args.push(arg);
        }

        Ok(Expression::Call {
            owner: self.owner.clone(),
            method: self.method.clone(),
            args,
            ty: signature.returns,
        })
    }
}

/// Stands in for operators with no host implementation. Lowering succeeds;
/// the produced expression fails when evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackImplementor;

impl CallImplementor for FallbackImplementor {
    fn implement(
        &self,
        _translator: &Translator<'_>,
        call: &CallNode,
        _null_as: NullAs,
    ) -> Result<Expression, CodegenError> {
        tracing::trace!(operator = %call.operator().id(), "no implementor registered, deferring failure");
        Ok(Expression::Fail {
            message: format!("{}: Enumerable implementation is empty", call.operator().name()),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BinaryImplementor {
    op: BinaryOp,
}

impl BinaryImplementor {
    pub const fn new(op: BinaryOp) -> Self {
        Self { op }
    }
}

impl CallImplementor for BinaryImplementor {
    fn implement(
        &self,
        translator: &Translator<'_>,
        call: &CallNode,
        null_as: NullAs,
    ) -> Result<Expression, CodegenError> {
        let [left, right] = call.operands() else {
            return Err(CodegenError::OperandCount {
                operator: call.operator().id().to_string(),
                expected: 2,
                count: call.operands().len(),
            });
        };
        Ok(Expression::binary(
            self.op,
            translator.translate(left, null_as)?,
            translator.translate(right, null_as)?,
            HostType::of(&call.result_type()),
        ))
    }
}

/// Division of a datetime difference: integral division whose result is
/// always converted to BIGINT.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatetimeDivideImplementor;

impl CallImplementor for DatetimeDivideImplementor {
    fn implement(
        &self,
        translator: &Translator<'_>,
        call: &CallNode,
        null_as: NullAs,
    ) -> Result<Expression, CodegenError> {
        let quotient = BinaryImplementor::new(BinaryOp::Divide).implement(translator, call, null_as)?;
        let bigint = HostType::new(HostKind::Long, call.result_type().nullable);
        Ok(Expression::convert(quotient, bigint))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnaryImplementor {
    op: UnaryOp,
}

impl UnaryImplementor {
    pub const fn new(op: UnaryOp) -> Self {
        Self { op }
    }
}

impl CallImplementor for UnaryImplementor {
    fn implement(
        &self,
        translator: &Translator<'_>,
        call: &CallNode,
        null_as: NullAs,
    ) -> Result<Expression, CodegenError> {
        let [operand] = call.operands() else {
            return Err(CodegenError::OperandCount {
                operator: call.operator().id().to_string(),
                expected: 1,
                count: call.operands().len(),
            });
        };
        Ok(Expression::unary(
            self.op,
            translator.translate(operand, null_as)?,
            HostType::of(&call.result_type()),
        ))
    }
}

/// `IS NULL` / `IS NOT NULL`. The operand is always lowered with nulls
/// preserved, whatever the caller asked for.
#[derive(Debug, Clone, Copy)]
pub struct IsNullImplementor {
    negated: bool,
}

impl IsNullImplementor {
    pub const fn is_null() -> Self {
        Self { negated: false }
    }

    pub const fn is_not_null() -> Self {
        Self { negated: true }
    }
}

impl CallImplementor for IsNullImplementor {
    fn implement(
        &self,
        translator: &Translator<'_>,
        call: &CallNode,
        _null_as: NullAs,
    ) -> Result<Expression, CodegenError> {
        let [operand] = call.operands() else {
            return Err(CodegenError::OperandCount {
                operator: call.operator().id().to_string(),
                expected: 1,
                count: call.operands().len(),
            });
        };
        let op = if self.negated { UnaryOp::IsNotNull } else { UnaryOp::IsNull };
        Ok(Expression::unary(
            op,
            translator.translate(operand, NullAs::Null)?,
            HostType::primitive(HostKind::Bool),
        ))
    }
}
