//! Key-case normalization for query parameters and decoded JSON.
//!
//! The remote API expects snake_case keys everywhere; responses occasionally
//! come back with camelCase keys depending on the serving path. Both
//! directions are normalized recursively over nested structures.

use serde_json::Value;

/// Convert a camelCase identifier to snake_case.
///
/// Already-snake_case input passes through unchanged.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a snake_case identifier to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for (i, c) in s.chars().enumerate() {
        if c == '_' && i > 0 {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively rewrite every object key in `value` to snake_case.
///
/// Arrays are traversed; scalar values are untouched.
pub fn deep_snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), deep_snake_case_keys(v)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(deep_snake_case_keys).collect())
        }
        other => other,
    }
}

/// Recursively rewrite every object key in `value` to camelCase.
pub fn deep_camel_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_camel_case(&k), deep_camel_case_keys(v)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(deep_camel_case_keys).collect())
        }
        other => other,
    }
}
