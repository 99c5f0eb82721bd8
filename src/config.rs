//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default base endpoint for the direct Cloud API.
pub const DEFAULT_BASE_ENDPOINT: &str = "https://graph.facebook.com";

/// Default API version segment.
pub const DEFAULT_API_VERSION: &str = "v24.0";

/// Host fragment identifying the pass-through proxy service.
pub const PROXY_DOMAIN: &str = "kapso.ai";

/// How the client authenticates. Exactly one mode exists by construction:
/// a bearer access token for the direct API, or an API key for the proxy.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    AccessToken(String),
    ProxyApiKey(String),
}

impl Credential {
    pub fn access_token(token: impl Into<String>) -> Self {
        Self::AccessToken(token.into())
    }

    pub fn proxy_api_key(key: impl Into<String>) -> Self {
        Self::ProxyApiKey(key.into())
    }
}

// Manual Debug so a credential never leaks into logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("Credential::AccessToken(***)"),
            Self::ProxyApiKey(_) => f.write_str("Credential::ProxyApiKey(***)"),
        }
    }
}

/// Immutable configuration shared by every call a [`Client`](crate::Client)
/// makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    credential: Credential,
    base_endpoint: String,
    api_version: String,
    timeout: Duration,
    connect_timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    proxy: bool,
}

impl ClientConfig {
    /// Default total request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default transport retry budget.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default base delay between transport retries.
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

    /// Create a configuration with the given credential and defaults for
    /// everything else.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_endpoint: DEFAULT_BASE_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
            proxy: false,
        }
    }

    /// Point the client at a different base endpoint.
    ///
    /// A missing scheme defaults to `https`; a trailing slash is stripped.
    /// Proxy mode is re-detected from the resulting host.
    pub fn with_base_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = endpoint.into();
        let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.clone()
        } else {
            format!("https://{raw}")
        };
        let normalized = with_scheme.trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&normalized).map_err(|_| ConfigError::InvalidEndpoint(raw.clone()))?;
        let host = parsed
            .host_str()
            .ok_or(ConfigError::InvalidEndpoint(raw))?;
        self.proxy = host == PROXY_DOMAIN || host.ends_with(&format!(".{PROXY_DOMAIN}"));
        self.base_endpoint = normalized;
        Ok(self)
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Transport retry budget. Zero disables mechanical retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Whether the base endpoint points at the pass-through proxy.
    pub fn is_proxy(&self) -> bool {
        self.proxy
    }
}
