//! Request URL assembly.
//!
//! Purely syntactic: joins `{base}/{version}/{path}` and flattens query
//! parameters into the bracket notation the remote API expects. No
//! validation of whether the resource path exists.

use serde_json::{Map, Value};
use url::Url;

use crate::casing::to_snake_case;
use crate::error::ConfigError;

/// Nested query-parameter structure. Maps flatten to `key[sub]=value`,
/// arrays to repeated `key=value`, nulls are omitted.
pub type Query = Map<String, Value>;

/// Build the absolute URL for a resource path under the configured base
/// endpoint and API version. A leading slash on `path` is ignored.
pub fn build_url(
    base: &str,
    version: &str,
    path: &str,
    query: Option<&Query>,
) -> Result<Url, ConfigError> {
    let clean_path = path.trim_start_matches('/');
    let root = format!("{base}/{version}/");
    let mut url = Url::parse(&root)
        .and_then(|u| u.join(clean_path))
        .map_err(|_| ConfigError::InvalidEndpoint(format!("{root}{clean_path}")))?;

    if let Some(query) = query {
        let pairs = flatten_query(query);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
    Ok(url)
}

/// Flatten a nested query structure into encoded key/value pairs.
///
/// Keys are normalized to snake_case recursively before flattening.
pub fn flatten_query(query: &Query) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (key, value) in query {
        flatten_into(&to_snake_case(key), value, &mut out);
    }
    out
}

fn flatten_into(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (sub, v) in map {
                flatten_into(&format!("{key}[{}]", to_snake_case(sub)), v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                flatten_into(key, v, out);
            }
        }
        Value::String(s) => out.push((key.to_string(), s.clone())),
        other => out.push((key.to_string(), other.to_string())),
    }
}
