//! Client façade.
//!
//! Owns the configuration and the transport, exposes one resource struct
//! per endpoint family, and orchestrates the transport retry loop. Only
//! transport failures are retried here; classified API errors carry their
//! retry hint back to the caller untouched.

pub mod calls;
pub mod contacts;
pub mod conversations;
pub mod flows;
pub mod media;
pub mod messages;
pub mod phone_numbers;
pub mod templates;

pub use calls::Calls;
pub use contacts::{ContactListParams, ContactUpdate, Contacts};
pub use conversations::{ConversationListParams, Conversations};
pub use flows::{FlowUpdate, Flows};
pub use media::{DownloadAuth, Media, MediaType, MediaUpload};
pub use messages::{MessageQuery, Messages};
pub use phone_numbers::{CodeMethod, PhoneNumbers};
pub use templates::{NewTemplate, TemplateCategory, TemplateListParams, Templates};

use std::sync::Arc;

use http::{HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, Credential};
use crate::endpoint::{build_url, Query};
use crate::error::{ApiError, Error, ProxyRequiredError, Result, TransportError};
use crate::response::{normalize, Decoded};
use crate::transport::{HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, Transport};

/// Client for the WhatsApp Cloud API (direct or through the proxy).
///
/// Cheap to share: all state is immutable configuration plus a pooled
/// transport, so concurrent calls need no synchronization.
pub struct Client {
    inner: Arc<Inner>,
    messages: Messages,
    media: Media,
    templates: Templates,
    phone_numbers: PhoneNumbers,
    calls: Calls,
    conversations: Conversations,
    contacts: Contacts,
    flows: Flows,
}

impl Client {
    /// Create a client with the production transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout(), config.connect_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a custom [`Transport`] (e.g. a mock in tests).
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let inner = Arc::new(Inner { config, transport });
        Self {
            messages: Messages::new(Arc::clone(&inner)),
            media: Media::new(Arc::clone(&inner)),
            templates: Templates::new(Arc::clone(&inner)),
            phone_numbers: PhoneNumbers::new(Arc::clone(&inner)),
            calls: Calls::new(Arc::clone(&inner)),
            conversations: Conversations::new(Arc::clone(&inner)),
            contacts: Contacts::new(Arc::clone(&inner)),
            flows: Flows::new(Arc::clone(&inner)),
            inner,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Whether the configured base endpoint is the pass-through proxy.
    pub fn is_proxy(&self) -> bool {
        self.inner.config.is_proxy()
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn phone_numbers(&self) -> &PhoneNumbers {
        &self.phone_numbers
    }

    pub fn calls(&self) -> &Calls {
        &self.calls
    }

    pub fn conversations(&self) -> &Conversations {
        &self.conversations
    }

    pub fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    pub fn flows(&self) -> &Flows {
        &self.flows
    }
}

/// Request body variants the façade can send.
pub(crate) enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// Shared core behind the resource structs.
pub(crate) struct Inner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Inner {
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Guard for proxy-only endpoints: fails before any network call when
    /// configured for the direct API.
    pub(crate) fn require_proxy(&self, feature: &'static str) -> Result<()> {
        if self.config.is_proxy() {
            Ok(())
        } else {
            Err(ProxyRequiredError::new(feature).into())
        }
    }

    /// Execute a versioned API request and normalize the response.
    ///
    /// Transport failures are retried up to the configured budget with a
    /// linearly increasing delay; an exhausted budget surfaces as a
    /// server-category [`ApiError`]. HTTP responses, success or error, are
    /// never retried here.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<RequestBody>,
    ) -> Result<Decoded> {
        let url = build_url(
            self.config.base_endpoint(),
            self.config.api_version(),
            path,
            query,
        )?;

        let (content_type, bytes) = match body {
            Some(RequestBody::Json(value)) => (
                HeaderValue::from_static("application/json"),
                Some(serde_json::to_vec(&value).map_err(anyhow::Error::new)?),
            ),
            Some(RequestBody::Multipart(form)) => (
                HeaderValue::from_str(&form.content_type())
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?,
                Some(form.encode()),
            ),
            None => (HeaderValue::from_static("application/json"), None),
        };

        let mut attempt: u32 = 0;
        loop {
            let mut req = HttpRequest::new(method.clone(), url.clone())
                .with_header(http::header::CONTENT_TYPE, content_type.clone());
            req = self.authorize(req)?;
            if let Some(bytes) = &bytes {
                req = req.with_body(bytes.clone());
            }

            tracing::debug!(method = %req.method, url = %req.url, "api request");
            match self.transport.execute(req).await {
                Ok(response) => {
                    tracing::debug!(status = %response.status, "api response");
                    return normalize(response).map_err(Error::Api);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries() => {
                    attempt += 1;
                    let delay = self.config.retry_delay() * attempt;
                    tracing::debug!(attempt, error = %e, delay_ms = delay.as_millis() as u64, "transport failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(Error::Api(ApiError::exhausted_transport(&e))),
            }
        }
    }

    /// Request and decode into a typed result.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<RequestBody>,
    ) -> Result<T> {
        let decoded = self.request(method, path, query, body).await?;
        decode(decoded.into_json())
    }

    /// One-shot fetch of an absolute URL (media downloads). No retry, no
    /// normalization; the caller inspects the response.
    pub(crate) async fn fetch_raw(&self, url: Url, with_auth: bool) -> Result<HttpResponse> {
        let mut req = HttpRequest::get(url);
        if with_auth {
            req = self.authorize(req)?;
        }
        tracing::debug!(url = %req.url, with_auth, "raw fetch");
        Ok(self.transport.execute(req).await?)
    }

    fn authorize(&self, req: HttpRequest) -> Result<HttpRequest> {
        let (name, value) = match self.config.credential() {
            Credential::AccessToken(token) => (
                http::header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")),
            ),
            Credential::ProxyApiKey(key) => (
                http::HeaderName::from_static("x-api-key"),
                HeaderValue::from_str(key),
            ),
        };
        let value = value.map_err(|_| {
            TransportError::InvalidRequest("credential contains invalid header characters".into())
        })?;
        Ok(req.with_header(name, value))
    }
}

/// Decode a normalized body into `T`.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Other(anyhow::Error::new(e).context("decoding response body")))
}

/// Insert a present value into a query map.
pub(crate) fn insert_opt(query: &mut Query, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        query.insert(key.to_string(), value.into());
    }
}

/// Some proxy endpoints wrap a single object in a `data` envelope; unwrap
/// it when present.
pub(crate) fn unwrap_data_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::{ErrorCategory, RetryAction};

    #[tokio::test]
    async fn bearer_auth_header_for_direct_mode() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"messaging_product":"whatsapp"}"#);
        client
            .messages()
            .send_text("123", crate::payload::TextMessage::new("+1", "hi"))
            .await
            .unwrap();
        let req = transport.last_request();
        assert_eq!(
            req.headers.get(http::header::AUTHORIZATION).unwrap(),
            "Bearer test-token"
        );
        assert_eq!(
            req.url.as_str(),
            "https://graph.facebook.com/v24.0/123/messages"
        );
    }

    #[tokio::test]
    async fn api_key_header_for_proxy_mode() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(200, r#"{"messaging_product":"whatsapp"}"#);
        client
            .messages()
            .send_text("123", crate::payload::TextMessage::new("+1", "hi"))
            .await
            .unwrap();
        let req = transport.last_request();
        assert!(req.headers.get(http::header::AUTHORIZATION).is_none());
        assert_eq!(req.headers.get("x-api-key").unwrap(), "test-key");
        assert!(req
            .url
            .as_str()
            .starts_with("https://app.kapso.ai/api/meta/v24.0/"));
    }

    #[tokio::test]
    async fn transport_failures_are_retried_then_wrapped() {
        let (client, transport) = mock_client(direct_config().with_max_retries(2));
        transport.push_response(Err(TransportError::Timeout));
        transport.push_response(Err(TransportError::Timeout));
        transport.push_response(Err(TransportError::Timeout));
        let err = client
            .messages()
            .send_text("123", crate::payload::TextMessage::new("+1", "hi"))
            .await
            .unwrap_err();
        // initial attempt + 2 retries
        assert_eq!(transport.request_count(), 3);
        let api = err.as_api_error().expect("wrapped as ApiError");
        assert_eq!(api.category, ErrorCategory::Server);
        assert_eq!(api.http_status, 0);
        assert!(api.message.starts_with("network error:"));
    }

    #[tokio::test]
    async fn transport_recovers_within_budget() {
        let (client, transport) = mock_client(direct_config());
        // Served in push order: one timeout, then success.
        transport.push_response(Err(TransportError::Timeout));
        transport.push_json(200, r#"{"messages":[{"id":"wamid.1"}]}"#);
        let resp = client
            .messages()
            .send_text("123", crate::payload::TextMessage::new("+1", "hi"))
            .await
            .unwrap();
        assert_eq!(transport.request_count(), 2);
        assert_eq!(resp.message_id(), Some("wamid.1"));
    }

    #[tokio::test]
    async fn classified_api_errors_are_not_retried() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(
            429,
            r#"{"error":{"message":"slow down","code":4,"type":"OAuthException"}}"#,
        );
        let err = client
            .messages()
            .send_text("123", crate::payload::TextMessage::new("+1", "hi"))
            .await
            .unwrap_err();
        assert_eq!(transport.request_count(), 1);
        let api = err.as_api_error().unwrap();
        assert_eq!(api.category, ErrorCategory::Throttling);
        assert_eq!(api.retry_hint.action, RetryAction::FixAndRetry);
    }

    #[tokio::test]
    async fn validation_failures_never_reach_the_transport() {
        let (client, transport) = mock_client(direct_config());
        let err = client
            .messages()
            .send_text("123", crate::payload::TextMessage::new("+1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn proxy_only_endpoint_fails_fast_in_direct_mode() {
        let (client, transport) = mock_client(direct_config());
        let err = client
            .conversations()
            .list("123", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProxyRequired(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn unwrap_data_envelope_behaviour() {
        let wrapped = serde_json::json!({"data": {"id": "c1"}});
        assert_eq!(unwrap_data_envelope(wrapped), serde_json::json!({"id": "c1"}));
        let plain = serde_json::json!({"id": "c1"});
        assert_eq!(unwrap_data_envelope(plain.clone()), plain);
    }
}
