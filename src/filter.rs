//! Query-parameter filtering over fixture documents.
//!
//! A parameter matches a field when the names are equal and the parameter's
//! value equals the field's [`canonical`] string form. Matching is exact; there
//! is no partial, case-insensitive or numeric comparison.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use thiserror::Error;

pub type QueryParameters = HashMap<String, String>;
pub type FilteredResult = Vec<Value>;

/// Returned when no parameters were given and the fixture is not an array, so
/// there is no list to hand back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fixture is {actual}, expected an array to serve without filters")]
pub struct ShapeMismatchError {
    pub actual: &'static str,
}

pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Whole floats up to 2^53 are exactly representable as integers.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn canonical_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER => {
            (f as i64).to_string()
        }
        // f64 Display is the shortest round-trip form and never uses an exponent.
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// String form used when comparing a JSON value to a query parameter.
///
/// A number with no fractional part prints as an integer whether it was
/// written `1`, `1.0` or `1e0`.
pub fn canonical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => canonical_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn field_matches(key: &str, value: &Value, params: &QueryParameters) -> bool {
    params
        .get(key)
        .is_some_and(|wanted| *wanted == canonical(value))
}

fn filter_object(map: &Map<String, Value>, params: &QueryParameters) -> FilteredResult {
    map.iter()
        .filter(|(key, value)| field_matches(key, value, params))
        .map(|(_, value)| value.clone())
        .collect()
}

fn filter_array(items: &[Value], params: &QueryParameters) -> FilteredResult {
    items
        .iter()
        .filter(|item| match item {
            Value::Object(fields) => fields
                .iter()
                .any(|(key, value)| field_matches(key, value, params)),
            _ => false,
        })
        .cloned()
        .collect()
}

/// Narrows `doc` to the entries matching `params`.
///
/// Object documents yield the matching field values; array documents yield
/// each matching object element once, in source order. The iteration order
/// of an object's fields is not guaranteed.
pub fn filter(doc: &Value, params: &QueryParameters) -> Result<FilteredResult, ShapeMismatchError> {
    if params.is_empty() {
        return match doc {
            Value::Array(items) => Ok(items.clone()),
            other => Err(ShapeMismatchError {
                actual: shape_name(other),
            }),
        };
    }

    Ok(match doc {
        Value::Object(map) => filter_object(map, params),
        Value::Array(items) => filter_array(items, params),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Vec::new(),
    })
}
