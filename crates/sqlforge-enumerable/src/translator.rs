//! Rex tree to host expression lowering

use sqlforge_ir::{RexNode, TypeName, Value};

use crate::expression::{Expression, HostKind, HostType};
use crate::implementor::NullAs;
use crate::method::MethodTable;
use crate::registry::ImplementorRegistry;
use crate::CodegenError;

/// Lowers rex trees by dispatching each call to its registered implementor.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    implementors: &'a ImplementorRegistry,
    methods: &'a MethodTable,
}

impl Translator<'static> {
    pub fn standard() -> Self {
        Self::new(ImplementorRegistry::standard(), MethodTable::standard())
    }
}

impl<'a> Translator<'a> {
    pub fn new(implementors: &'a ImplementorRegistry, methods: &'a MethodTable) -> Self {
        Self { implementors, methods }
    }

    pub fn methods(&self) -> &'a MethodTable {
        self.methods
    }

    pub fn translate(&self, rex: &RexNode, null_as: NullAs) -> Result<Expression, CodegenError> {
        let expr = match rex {
            RexNode::Literal(lit) => Expression::constant(lit.value.clone(), HostType::of(&lit.ty)),
            RexNode::InputRef { index, ty, .. } => Expression::Parameter {
                index: *index,
                ty: HostType::of(&ty.nullify()),
            },
            RexNode::Call(call) => {
                let implementor = self.implementors.lookup(call.operator().id());
                implementor.implement(self, call, null_as)?
            }
        };
        Ok(apply_null_as(expr, &rex.ty().name, null_as))
    }
}

fn apply_null_as(expr: Expression, sql_type: &TypeName, null_as: NullAs) -> Expression {
    if expr.is_fail() {
        return expr;
    }
    let boolean = *sql_type == TypeName::Boolean;
    match null_as {
        NullAs::False if boolean => Expression::coalesce(
            expr,
            Expression::constant(Value::Bool(false), HostType::primitive(HostKind::Bool)),
        ),
        NullAs::True if boolean => Expression::coalesce(
            expr,
            Expression::constant(Value::Bool(true), HostType::primitive(HostKind::Bool)),
        ),
        NullAs::NotPossible => {
            let ty = expr.ty();
            if ty.boxed && ty.kind.is_primitive() {
                Expression::convert(expr, HostType::primitive(ty.kind))
            } else {
                expr
            }
        }
        _ => expr,
    }
}
