//! Response normalization.
//!
//! Converts a raw HTTP response into a decoded success value or a
//! classified [`ApiError`], unifying the direct and proxy error envelope
//! shapes.

use bytes::Bytes;
use serde_json::Value;

use crate::casing::deep_snake_case_keys;
use crate::error::ApiError;
use crate::transport::HttpResponse;

/// A normalized successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Parsed JSON with keys normalized to snake_case.
    Json(Value),
    /// No content (204 or an empty JSON body).
    Empty,
    /// Non-JSON payload, unchanged.
    Raw(Bytes),
}

impl Decoded {
    /// The JSON value, treating an empty success as `{}`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(v) => v,
            Self::Empty => Value::Object(serde_json::Map::new()),
            Self::Raw(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// Normalize a raw response.
///
/// Any non-2xx status routes into error classification regardless of
/// content-type. For 2xx: JSON bodies are parsed and key-normalized, 204
/// and empty JSON bodies become [`Decoded::Empty`], anything else passes
/// through as raw bytes. A JSON-labelled body that fails to parse is
/// itself an [`ApiError`] with the status preserved and the body attached.
pub fn normalize(response: HttpResponse) -> Result<Decoded, ApiError> {
    let status = response.status.as_u16();
    if !response.is_success() {
        return Err(ApiError::from_response(
            status,
            &response.headers,
            &response.body,
        ));
    }

    let content_type = response
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("application/json") {
        return parse_json(status, &response.body);
    }

    if status == 204 {
        return Ok(Decoded::Empty);
    }

    Ok(Decoded::Raw(Bytes::from(response.body)))
}

fn parse_json(status: u16, body: &[u8]) -> Result<Decoded, ApiError> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return Ok(Decoded::Empty);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(Decoded::Json(deep_snake_case_keys(value))),
        Err(e) => Err(ApiError::invalid_json(status, &e, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use http::{HeaderMap, HeaderValue, StatusCode};

    fn json_response(status: StatusCode, body: &str) -> HttpResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        HttpResponse::new(status, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn json_body_is_parsed_and_key_normalized() {
        let resp = json_response(StatusCode::OK, r#"{"messagingProduct":"whatsapp"}"#);
        let decoded = normalize(resp).unwrap();
        assert_eq!(
            decoded,
            Decoded::Json(serde_json::json!({"messaging_product": "whatsapp"}))
        );
    }

    #[test]
    fn no_content_is_empty_success() {
        let resp = HttpResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), Vec::new());
        assert_eq!(normalize(resp).unwrap(), Decoded::Empty);
    }

    #[test]
    fn empty_json_body_is_empty_success() {
        let resp = json_response(StatusCode::OK, "  ");
        assert_eq!(normalize(resp).unwrap(), Decoded::Empty);
    }

    #[test]
    fn non_json_body_passes_through_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("image/jpeg"),
        );
        let resp = HttpResponse::new(StatusCode::OK, headers, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(
            normalize(resp).unwrap(),
            Decoded::Raw(Bytes::from(vec![0xFF, 0xD8, 0xFF]))
        );
    }

    #[test]
    fn malformed_json_is_an_api_error_with_body_attached() {
        let resp = json_response(StatusCode::OK, "{not json");
        let err = normalize(resp).unwrap_err();
        assert_eq!(err.http_status, 200);
        assert!(err.message.starts_with("invalid JSON response:"));
        assert_eq!(err.raw_response.as_deref(), Some("{not json"));
    }

    #[test]
    fn non_2xx_routes_to_classification_regardless_of_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/html"),
        );
        let resp = HttpResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            headers,
            b"<html>down</html>".to_vec(),
        );
        let err = normalize(resp).unwrap_err();
        assert_eq!(err.category, ErrorCategory::Server);
        assert_eq!(err.http_status, 503);
    }

    #[test]
    fn empty_decoded_maps_to_empty_object() {
        assert_eq!(
            Decoded::Empty.into_json(),
            serde_json::json!({})
        );
    }
}
