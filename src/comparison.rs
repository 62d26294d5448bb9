use std::cmp::Ordering;

use crate::errors::{ExprError, Result};
use crate::eval::Value;

/// Equality with Int/Float cross-coercion; every other pair only matches
/// on identical type and content.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        _ => a == b,
    }
}

/// Ordering for the relational operators: numbers against numbers,
/// strings against strings. Anything else is a runtime error.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Result<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            as_f64(a).partial_cmp(&as_f64(b)).ok_or_else(|| {
                ExprError::Runtime("cannot order against a NaN".into())
            })
        }
        _ => Err(ExprError::Runtime(format!(
            "cannot order {} against {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}
