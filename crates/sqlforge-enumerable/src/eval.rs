//! Interpreter for lowered host expressions

use sqlforge_ir::Value;
use std::cmp::Ordering;

use crate::expression::{BinaryOp, Expression, HostKind, HostType, UnaryOp};
use crate::method::MethodTable;
use crate::EvalError;

/// Evaluates `expr` against one input row.
pub fn evaluate(expr: &Expression, row: &[Value], methods: &MethodTable) -> Result<Value, EvalError> {
    match expr {
        Expression::Constant { value, .. } => Ok(value.clone()),
        Expression::Parameter { index, .. } => row.get(*index).cloned().ok_or(EvalError::MissingParameter(*index)),
        Expression::Convert { operand, ty } => convert(evaluate(operand, row, methods)?, *ty),
        Expression::Call { owner, method, args, .. } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, row, methods))
                .collect::<Result<Vec<_>, _>>()?;
            methods.invoke(owner, method, &values)
        }
        Expression::Binary { op, left, right, .. } => match op {
            BinaryOp::AndAlso => and(evaluate(left, row, methods)?, || evaluate(right, row, methods)),
            BinaryOp::OrElse => or(evaluate(left, row, methods)?, || evaluate(right, row, methods)),
            _ => binary(*op, evaluate(left, row, methods)?, evaluate(right, row, methods)?),
        },
        Expression::Unary { op, operand, .. } => unary(*op, evaluate(operand, row, methods)?),
        Expression::Coalesce { operand, fallback } => match evaluate(operand, row, methods)? {
            Value::Null => evaluate(fallback, row, methods),
            value => Ok(value),
        },
        Expression::Fail { message } => Err(EvalError::UnimplementedOperator(message.clone())),
    }
}

fn convert(value: Value, ty: HostType) -> Result<Value, EvalError> {
    if value.is_null() {
        return if ty.can_hold_null() {
            Ok(Value::Null)
        } else {
            Err(EvalError::NullConversion(ty.to_string()))
        };
    }
    match (ty.kind, value) {
        (HostKind::Object, v) => Ok(v),
        (HostKind::Bool, v @ Value::Bool(_)) => Ok(v),
        (HostKind::Int | HostKind::Long, v @ Value::Int(_)) => Ok(v),
        (HostKind::Int | HostKind::Long, Value::Float(x)) => Ok(Value::Int(x.trunc() as i64)),
        (HostKind::Double, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (HostKind::Double, v @ Value::Float(_)) => Ok(v),
        (HostKind::String, Value::String(s)) => Ok(Value::String(s)),
        (HostKind::String, v) => Ok(Value::String(v.to_string())),
        (HostKind::Symbol, v @ Value::Symbol { .. }) => Ok(v),
        (kind, v) => Err(EvalError::TypeMismatch(format!("cannot convert {} to {:?}", v, kind))),
    }
}

fn and(left: Value, right: impl FnOnce() -> Result<Value, EvalError>) -> Result<Value, EvalError> {
    match left {
        Value::Bool(false) => Ok(Value::Bool(false)),
        Value::Bool(true) => match right()? {
            v @ (Value::Bool(_) | Value::Null) => Ok(v),
            other => Err(EvalError::TypeMismatch(format!("AND expects a boolean, got {}", other))),
        },
        Value::Null => match right()? {
            Value::Bool(false) => Ok(Value::Bool(false)),
            Value::Bool(true) | Value::Null => Ok(Value::Null),
            other => Err(EvalError::TypeMismatch(format!("AND expects a boolean, got {}", other))),
        },
        other => Err(EvalError::TypeMismatch(format!("AND expects a boolean, got {}", other))),
    }
}

fn or(left: Value, right: impl FnOnce() -> Result<Value, EvalError>) -> Result<Value, EvalError> {
    match left {
        Value::Bool(true) => Ok(Value::Bool(true)),
        Value::Bool(false) => match right()? {
            v @ (Value::Bool(_) | Value::Null) => Ok(v),
            other => Err(EvalError::TypeMismatch(format!("OR expects a boolean, got {}", other))),
        },
        Value::Null => match right()? {
            Value::Bool(true) => Ok(Value::Bool(true)),
            Value::Bool(false) | Value::Null => Ok(Value::Null),
            other => Err(EvalError::TypeMismatch(format!("OR expects a boolean, got {}", other))),
        },
        other => Err(EvalError::TypeMismatch(format!("OR expects a boolean, got {}", other))),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    if op.is_comparison() {
        let ordering = compare(&left, &right)?;
        let result = match op {
            BinaryOp::Equal => ordering == Ordering::Equal,
            BinaryOp::NotEqual => ordering != Ordering::Equal,
            BinaryOp::LessThan => ordering == Ordering::Less,
            BinaryOp::LessThanOrEqual => ordering != Ordering::Greater,
            BinaryOp::GreaterThan => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        };
        return Ok(Value::Bool(result));
    }

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => match op {
            BinaryOp::Plus => Ok(Value::Int(a.wrapping_add(b))),
            BinaryOp::Minus => Ok(Value::Int(a.wrapping_sub(b))),
            BinaryOp::Times => Ok(Value::Int(a.wrapping_mul(b))),
            BinaryOp::Divide if b == 0 => Err(EvalError::DivisionByZero),
            BinaryOp::Divide => Ok(Value::Int(a.wrapping_div(b))),
            BinaryOp::Mod if b == 0 => Err(EvalError::DivisionByZero),
            BinaryOp::Mod => Ok(Value::Int(a.wrapping_rem(b))),
            _ => Err(EvalError::TypeMismatch(format!("{} is not arithmetic", op.symbol()))),
        },
        (l, r) => {
            let (a, b) = (as_f64(&l)?, as_f64(&r)?);
            match op {
                BinaryOp::Plus => Ok(Value::Float(a + b)),
                BinaryOp::Minus => Ok(Value::Float(a - b)),
                BinaryOp::Times => Ok(Value::Float(a * b)),
                BinaryOp::Divide | BinaryOp::Mod if b == 0.0 => Err(EvalError::DivisionByZero),
                BinaryOp::Divide => Ok(Value::Float(a / b)),
                BinaryOp::Mod => Ok(Value::Float(a % b)),
                _ => Err(EvalError::TypeMismatch(format!("{} is not arithmetic", op.symbol()))),
            }
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::IsNull, v) => Ok(Value::Bool(v.is_null())),
        (UnaryOp::IsNotNull, v) => Ok(Value::Bool(!v.is_null())),
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
        (UnaryOp::Negate, Value::Float(x)) => Ok(Value::Float(-x)),
        (op, v) => Err(EvalError::TypeMismatch(format!("cannot apply {:?} to {}", op, v))),
    }
}

fn as_f64(v: &Value) -> Result<f64, EvalError> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(x) => Ok(*x),
        other => Err(EvalError::TypeMismatch(format!("expected a number, got {}", other))),
    }
}

fn compare(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            as_f64(left)?.partial_cmp(&as_f64(right)?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    };
    ordering.ok_or_else(|| EvalError::TypeMismatch(format!("cannot compare {} with {}", left, right)))
}
