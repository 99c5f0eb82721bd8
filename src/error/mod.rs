use thiserror::Error;

mod api;
mod classify;

pub use api::ApiError;
pub use classify::{
    categorize, derive_retry_hint, parse_retry_after, ErrorCategory, RetryAction, RetryHint,
};

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Cloud API client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("api: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    ProxyRequired(#[from] ProxyRequiredError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// The classified API error, when this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Client configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid base endpoint '{0}'")]
    InvalidEndpoint(String),
}

/// Invalid input rejected by a payload builder before any network call.
///
/// Distinct from [`ApiError`]: the request was never sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub(crate) fn required(field: &str) -> Self {
        Self(format!("{field} is required"))
    }

    pub(crate) fn too_long(field: &str, max: usize, actual: usize) -> Self {
        Self(format!("{field} max {max} characters (current: {actual})"))
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Transport-level failures (no HTTP response was obtained).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request timed out")]
    Timeout,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether the façade may mechanically retry this failure.
    /// Connection failures and timeouts are transient; a request the
    /// client itself could not build is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

/// A proxy-only endpoint was called while configured for the direct API.
#[derive(Error, Debug, Clone)]
#[error("{feature} is only available through the proxy service; configure a proxy base endpoint and an API key")]
pub struct ProxyRequiredError {
    pub feature: &'static str,
}

impl ProxyRequiredError {
    pub(crate) fn new(feature: &'static str) -> Self {
        Self { feature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages() {
        let e = ValidationError::required("body_text");
        assert_eq!(e.message(), "body_text is required");
        let e = ValidationError::too_long("display_text", 20, 21);
        assert_eq!(e.message(), "display_text max 20 characters (current: 21)");
    }

    #[test]
    fn transport_retryability() {
        assert!(TransportError::Timeout.is_retryable());
        assert!(TransportError::Connection("refused".into()).is_retryable());
        assert!(!TransportError::InvalidRequest("bad header".into()).is_retryable());
    }

    #[test]
    fn proxy_required_names_the_feature() {
        let e = ProxyRequiredError::new("Conversations API");
        assert!(e.to_string().starts_with("Conversations API is only available"));
    }
}
