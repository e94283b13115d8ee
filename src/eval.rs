//! Expression evaluator for row filter expressions.
//!
//! Evaluates parsed filter ASTs against any row type that exposes its cells
//! through [`Fields`].

use crate::error::{Error, Result};
use crate::filter::{AccessPart, BinaryOp, Expr, UnaryOp};
use crate::record::VariantRecord;
use crate::value::Value;

/// Namespaces that can qualify a field name, e.g. `INFO.DP`.
pub const NAMESPACES: &[&str] = &["INFO", "META"];

/// Named cell access for filterable rows.
pub trait Fields {
    /// Unqualified lookup, `Value::Missing` for unknown names.
    fn field(&self, name: &str) -> Value;

    /// Lookup restricted to one of [`NAMESPACES`].
    fn namespaced(&self, namespace: &str, name: &str) -> Value;
}

impl Fields for VariantRecord {
    fn field(&self, name: &str) -> Value {
        self.get(name)
    }

    fn namespaced(&self, namespace: &str, name: &str) -> Value {
        match namespace {
            "INFO" => self.info_field(name),
            _ => Value::Missing,
        }
    }
}

/// Evaluate a filter expression against a row.
pub fn evaluate<F: Fields + ?Sized>(expr: &Expr, row: &F) -> Result<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Var(parts) => resolve_variable(parts, row),
        Expr::Binary(left, op, right) => evaluate_binary(left, op, right, row),
        Expr::Unary(op, inner) => evaluate_unary(op, inner, row),
        Expr::Exists(parts) => {
            let value = resolve_variable(parts, row)?;
            Ok(Value::Bool(!value.is_missing()))
        }
        Expr::Round(inner) => round_value(evaluate(inner, row)?),
    }
}

/// Round half to even; missing stays missing.
fn round_value(value: Value) -> Result<Value> {
    match value {
        Value::Missing => Ok(Value::Missing),
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(round_value)
                .collect::<Result<Vec<_>>>()?,
        )),
        other => match other.as_number() {
            Some(n) => Ok(Value::Number(n.round_ties_even())),
            None => Err(Error::Evaluation(format!(
                "round() expects a number, got {}",
                other
            ))),
        },
    }
}

/// Resolve a variable access path to a value.
fn resolve_variable<F: Fields + ?Sized>(parts: &[AccessPart], row: &F) -> Result<Value> {
    let field_name = match parts.first() {
        Some(AccessPart::Field(name)) => name,
        Some(_) => {
            return Err(Error::Evaluation(
                "Variable must start with a field name".to_string(),
            ));
        }
        None => return Ok(Value::Missing),
    };

    let (mut value, rest) = if NAMESPACES.contains(&field_name.as_str()) {
        match parts.get(1) {
            Some(AccessPart::Field(name)) => (row.namespaced(field_name, name), &parts[2..]),
            _ => return Ok(Value::Missing),
        }
    } else {
        (row.field(field_name), &parts[1..])
    };

    for part in rest {
        value = match (part, value) {
            (AccessPart::Index(i), Value::Array(items)) => {
                items.into_iter().nth(*i).unwrap_or(Value::Missing)
            }
            // A single value behaves like a one-element list.
            (AccessPart::Index(0), scalar) => scalar,
            _ => Value::Missing,
        };
    }

    Ok(value)
}

/// Evaluate a binary operation.
fn evaluate_binary<F: Fields + ?Sized>(
    left: &Expr,
    op: &BinaryOp,
    right: &Expr,
    row: &F,
) -> Result<Value> {
    let left_val = evaluate(left, row)?;

    // Short-circuit before touching the right side.
    match op {
        BinaryOp::And if !value_to_bool(&left_val) => return Ok(Value::Bool(false)),
        BinaryOp::Or if value_to_bool(&left_val) => return Ok(Value::Bool(true)),
        BinaryOp::And | BinaryOp::Or => {
            let right_val = evaluate(right, row)?;
            return Ok(Value::Bool(value_to_bool(&right_val)));
        }
        _ => {}
    }

    let right_val = evaluate(right, row)?;

    // Missing on either side compares false, including `!=`.
    if left_val.is_missing() || right_val.is_missing() {
        return Ok(Value::Bool(false));
    }

    // Multi-valued cells match if any element does
    if let Value::Array(ref arr) = left_val {
        let result = match op {
            BinaryOp::Eq => arr.iter().any(|v| values_equal(v, &right_val)),
            BinaryOp::NotEq => arr.iter().all(|v| !values_equal(v, &right_val)),
            BinaryOp::Contains => arr.iter().any(|v| value_contains(v, &right_val)),
            _ => arr
                .iter()
                .any(|v| compare_values(v, op, &right_val).unwrap_or(false)),
        };
        return Ok(Value::Bool(result));
    }

    let result = match op {
        BinaryOp::Eq => values_equal(&left_val, &right_val),
        BinaryOp::NotEq => !values_equal(&left_val, &right_val),
        BinaryOp::Contains => value_contains(&left_val, &right_val),
        _ => compare_values(&left_val, op, &right_val)?,
    };
    Ok(Value::Bool(result))
}

/// Evaluate a unary operation.
fn evaluate_unary<F: Fields + ?Sized>(op: &UnaryOp, inner: &Expr, row: &F) -> Result<Value> {
    let val = evaluate(inner, row)?;

    match op {
        UnaryOp::Not => Ok(Value::Bool(!value_to_bool(&val))),
    }
}

/// Check if two values are equal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => (l - r).abs() < f64::EPSILON,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        // Metadata cells are text; compare numerically when they look numeric
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|sn| (sn - n).abs() < f64::EPSILON)
            .unwrap_or(false),
        _ => false,
    }
}

/// Check if left contains right (string containment).
fn value_contains(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l.contains(r.as_str()),
        _ => false,
    }
}

fn ordering_holds(op: &BinaryOp, ord: std::cmp::Ordering) -> Result<bool> {
    use std::cmp::Ordering::*;
    match op {
        BinaryOp::Lt => Ok(ord == Less),
        BinaryOp::Gt => Ok(ord == Greater),
        BinaryOp::LtEq => Ok(ord != Greater),
        BinaryOp::GtEq => Ok(ord != Less),
        _ => Err(Error::Evaluation(format!(
            "Unexpected operator in comparison: {:?}",
            op
        ))),
    }
}

/// Compare two values with an ordering operator. Missing compares false.
fn compare_values(left: &Value, op: &BinaryOp, right: &Value) -> Result<bool> {
    if left.is_missing() || right.is_missing() {
        return Ok(false);
    }

    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return match l.partial_cmp(&r) {
            Some(ord) => ordering_holds(op, ord),
            None => Ok(false),
        };
    }

    match (left, right) {
        (Value::String(l), Value::String(r)) => ordering_holds(op, l.cmp(r)),
        _ => Err(Error::TypeMismatch {
            left: left.type_name().to_string(),
            right: right.type_name().to_string(),
        }),
    }
}

/// Truthiness of a value.
fn value_to_bool(val: &Value) -> bool {
    match val {
        Value::Bool(b) => *b,
        Value::Missing => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => *n != 0.0,
        Value::Array(arr) => !arr.is_empty(),
    }
}
