//! Classified API error value object.

use std::time::SystemTime;

use http::HeaderMap;
use serde_json::Value;

use super::classify::{
    categorize, derive_retry_hint, parse_retry_after, ErrorCategory, RetryAction, RetryHint,
    REFRESH_TOKEN_CODES, TRANSIENT_CODES,
};

/// A failed API call, classified.
///
/// Constructed once per failure from either a parsed error envelope or a
/// generic HTTP failure; immutable afterwards. Carries the semantic
/// [`ErrorCategory`] and a [`RetryHint`] for caller-side retry loops.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub http_status: u16,
    /// Platform error code; absent when no response was obtained.
    pub code: Option<i64>,
    pub category: ErrorCategory,
    pub message: String,
    /// Platform error type string from the envelope.
    pub error_type: Option<String>,
    /// Human-oriented detail text from the envelope's `error_data`.
    pub details: Option<String>,
    pub subcode: Option<i64>,
    pub trace_id: Option<String>,
    pub error_data: Option<Value>,
    pub retry_hint: RetryHint,
    /// Raw response body, kept for diagnostics.
    pub raw_response: Option<String>,
}

impl ApiError {
    /// Build from a non-2xx HTTP response.
    ///
    /// Recognizes the direct envelope (`{"error": {...}}`), the proxy
    /// envelope (`{"error": "..."}`), and falls back to a generic HTTP
    /// failure carrying the raw text.
    pub fn from_response(status: u16, headers: &HeaderMap, body: &[u8]) -> Self {
        Self::from_response_at(status, headers, body, SystemTime::now())
    }

    /// As [`from_response`](Self::from_response), with an injected `now`
    /// for Retry-After date arithmetic.
    pub fn from_response_at(
        status: u16,
        headers: &HeaderMap,
        body: &[u8],
        now: SystemTime,
    ) -> Self {
        let retry_after_ms = headers
            .get(http::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| parse_retry_after(v, now));

        let text = String::from_utf8_lossy(body).into_owned();
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        match parsed.as_ref().and_then(|v| v.get("error")) {
            Some(Value::Object(envelope)) => {
                let code = envelope.get("code").and_then(Value::as_i64);
                let effective = code.unwrap_or(i64::from(status));
                let message = envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| default_message(status, &text), str::to_owned);
                let error_data = envelope.get("error_data").cloned();
                let details = error_data
                    .as_ref()
                    .and_then(|d| d.get("details"))
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                Self {
                    http_status: status,
                    code: Some(effective),
                    category: categorize(Some(effective), status),
                    message,
                    error_type: envelope
                        .get("type")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    details,
                    subcode: envelope.get("error_subcode").and_then(Value::as_i64),
                    trace_id: envelope
                        .get("fbtrace_id")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    error_data,
                    retry_hint: derive_retry_hint(Some(effective), status, retry_after_ms),
                    raw_response: Some(text),
                }
            }
            Some(Value::String(message)) => {
                // Proxy envelope: a bare string, no code of its own.
                let code = i64::from(status);
                Self {
                    http_status: status,
                    code: Some(code),
                    category: categorize(None, status),
                    message: message.clone(),
                    error_type: None,
                    details: None,
                    subcode: None,
                    trace_id: None,
                    error_data: None,
                    retry_hint: derive_retry_hint(Some(code), status, retry_after_ms),
                    raw_response: Some(text),
                }
            }
            _ => {
                let code = i64::from(status);
                Self {
                    http_status: status,
                    code: Some(code),
                    category: categorize(None, status),
                    message: default_message(status, &text),
                    error_type: None,
                    details: None,
                    subcode: None,
                    trace_id: None,
                    error_data: None,
                    retry_hint: derive_retry_hint(Some(code), status, retry_after_ms),
                    raw_response: (!text.is_empty()).then_some(text),
                }
            }
        }
    }

    /// A JSON-labelled body that failed to parse. Status is preserved and
    /// the raw body attached for diagnostics.
    pub(crate) fn invalid_json(status: u16, parse_error: &serde_json::Error, body: &[u8]) -> Self {
        Self {
            http_status: status,
            code: Some(i64::from(status)),
            category: categorize(None, status),
            message: format!("invalid JSON response: {parse_error}"),
            error_type: None,
            details: None,
            subcode: None,
            trace_id: None,
            error_data: None,
            retry_hint: derive_retry_hint(Some(i64::from(status)), status, None),
            raw_response: Some(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Transport failure after the retry budget was exhausted.
    pub(crate) fn exhausted_transport(source: &crate::error::TransportError) -> Self {
        Self {
            http_status: 0,
            code: None,
            category: ErrorCategory::Server,
            message: format!("network error: {source}"),
            error_type: None,
            details: None,
            subcode: None,
            trace_id: None,
            error_data: None,
            retry_hint: RetryHint::retry(),
            raw_response: None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        self.category == ErrorCategory::Authorization
    }

    pub fn is_rate_limit(&self) -> bool {
        self.category == ErrorCategory::Throttling
    }

    /// Whether the failure is plausibly transient.
    pub fn is_temporary(&self) -> bool {
        matches!(
            self.category,
            ErrorCategory::Throttling | ErrorCategory::Server | ErrorCategory::Synchronization
        ) || self.http_status >= 500
            || self.code.is_some_and(|c| TRANSIENT_CODES.contains(&c))
    }

    pub fn is_template_error(&self) -> bool {
        self.category == ErrorCategory::Template
    }

    pub fn requires_token_refresh(&self) -> bool {
        self.category == ErrorCategory::Authorization
            || self.code.is_some_and(|c| REFRESH_TOKEN_CODES.contains(&c))
    }

    /// True unless the hint says retrying can never succeed.
    pub fn is_retryable(&self) -> bool {
        self.retry_hint.action != RetryAction::DoNotRetry
    }
}

fn default_message(status: u16, raw_text: &str) -> String {
    let raw_text = raw_text.trim();
    if raw_text.is_empty() {
        format!("Cloud API request failed with status {status}")
    } else {
        format!("Cloud API request failed with status {status}: {raw_text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::RETRY_AFTER;

    fn headers_with_retry_after(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(RETRY_AFTER, value.parse().unwrap());
        h
    }

    #[test]
    fn parses_direct_envelope() {
        let body = serde_json::json!({
            "error": {
                "message": "(#131047) Re-engagement message",
                "type": "OAuthException",
                "code": 131047,
                "error_subcode": 2018278,
                "fbtrace_id": "Az8or2yhqkZfEZ-_4Qn_Bam",
                "error_data": { "details": "outside the allowed window" }
            }
        })
        .to_string();
        let err = ApiError::from_response(400, &HeaderMap::new(), body.as_bytes());
        assert_eq!(err.http_status, 400);
        assert_eq!(err.code, Some(131047));
        assert_eq!(err.category, ErrorCategory::ReengagementWindow);
        assert_eq!(err.message, "(#131047) Re-engagement message");
        assert_eq!(err.subcode, Some(2018278));
        assert_eq!(err.trace_id.as_deref(), Some("Az8or2yhqkZfEZ-_4Qn_Bam"));
        assert_eq!(err.details.as_deref(), Some("outside the allowed window"));
        assert_eq!(err.retry_hint.action, RetryAction::DoNotRetry);
        assert!(!err.is_retryable());
    }

    #[test]
    fn parses_proxy_envelope() {
        let body = br#"{"error": "invalid api key"}"#;
        let err = ApiError::from_response(401, &HeaderMap::new(), body);
        assert_eq!(err.message, "invalid api key");
        assert_eq!(err.code, Some(401));
        assert_eq!(err.category, ErrorCategory::Authorization);
    }

    #[test]
    fn generic_failure_carries_raw_text() {
        let err = ApiError::from_response(502, &HeaderMap::new(), b"Bad Gateway");
        assert_eq!(err.category, ErrorCategory::Server);
        assert_eq!(err.message, "Cloud API request failed with status 502: Bad Gateway");
        assert_eq!(err.raw_response.as_deref(), Some("Bad Gateway"));
        assert_eq!(err.retry_hint.action, RetryAction::Retry);
    }

    #[test]
    fn generic_failure_with_empty_body() {
        let err = ApiError::from_response(404, &HeaderMap::new(), b"");
        assert_eq!(err.message, "Cloud API request failed with status 404");
        assert_eq!(err.category, ErrorCategory::Parameter);
        assert!(err.raw_response.is_none());
    }

    #[test]
    fn throttled_with_retry_after_header() {
        let body = serde_json::json!({
            "error": { "message": "rate limit hit", "type": "OAuthException", "code": 4 }
        })
        .to_string();
        let err = ApiError::from_response(429, &headers_with_retry_after("30"), body.as_bytes());
        assert_eq!(err.category, ErrorCategory::Throttling);
        assert_eq!(err.retry_hint.action, RetryAction::RetryAfter);
        assert_eq!(err.retry_hint.retry_after_ms, Some(30_000));
        assert!(err.is_rate_limit());
        assert!(err.is_temporary());
    }

    #[test]
    fn classification_is_idempotent() {
        let body = serde_json::json!({
            "error": { "message": "expired token", "code": 190 }
        })
        .to_string();
        let a = ApiError::from_response(401, &HeaderMap::new(), body.as_bytes());
        let b = ApiError::from_response(401, &HeaderMap::new(), body.as_bytes());
        assert_eq!(a.code, b.code);
        assert_eq!(a.category, b.category);
        assert_eq!(a.retry_hint, b.retry_hint);
        assert_eq!(a.message, b.message);
        assert!(a.requires_token_refresh());
        assert_eq!(a.retry_hint.action, RetryAction::RefreshToken);
    }

    #[test]
    fn transient_code_is_temporary() {
        let body = serde_json::json!({
            "error": { "message": "unknown upstream", "code": 2 }
        })
        .to_string();
        let err = ApiError::from_response(400, &HeaderMap::new(), body.as_bytes());
        assert!(err.is_temporary());
    }
}
