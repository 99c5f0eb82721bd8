//! Conversation tracking endpoints. All proxy-only.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use super::{decode, insert_opt, unwrap_data_envelope, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{Result, ValidationError};
use crate::types::{ConversationRecord, PagedResult, SuccessResponse};

const FEATURE: &str = "Conversations API";

/// Conversation endpoints.
pub struct Conversations {
    inner: Arc<Inner>,
}

impl Conversations {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub async fn list(
        &self,
        phone_number_id: &str,
        params: ConversationListParams,
    ) -> Result<PagedResult<ConversationRecord>> {
        self.inner.require_proxy(FEATURE)?;
        let query = params.into_query();
        self.inner
            .request_json(
                Method::GET,
                &format!("{phone_number_id}/conversations"),
                Some(&query),
                None,
            )
            .await
    }

    pub async fn get(&self, conversation_id: &str) -> Result<ConversationRecord> {
        self.inner.require_proxy(FEATURE)?;
        require_id(conversation_id)?;
        let decoded = self
            .inner
            .request(
                Method::GET,
                &format!("conversations/{conversation_id}"),
                None,
                None,
            )
            .await?;
        decode(unwrap_data_envelope(decoded.into_json()))
    }

    pub async fn update_status(
        &self,
        conversation_id: &str,
        status: &str,
    ) -> Result<SuccessResponse> {
        self.inner.require_proxy(FEATURE)?;
        require_id(conversation_id)?;
        if status.trim().is_empty() {
            return Err(ValidationError::required("status").into());
        }
        self.inner
            .request_json(
                Method::PATCH,
                &format!("conversations/{conversation_id}"),
                None,
                Some(RequestBody::Json(json!({ "status": status }))),
            )
            .await
    }

    pub async fn archive(&self, conversation_id: &str) -> Result<SuccessResponse> {
        self.update_status(conversation_id, "archived").await
    }

    pub async fn unarchive(&self, conversation_id: &str) -> Result<SuccessResponse> {
        self.update_status(conversation_id, "active").await
    }

    pub async fn end(&self, conversation_id: &str) -> Result<SuccessResponse> {
        self.update_status(conversation_id, "ended").await
    }

    /// Aggregated conversation metrics.
    pub async fn analytics(
        &self,
        phone_number_id: &str,
        conversation_id: Option<&str>,
        since: Option<&str>,
        until: Option<&str>,
        granularity: Option<&str>,
    ) -> Result<Value> {
        self.inner.require_proxy("Conversation Analytics API")?;
        let mut query = Query::new();
        insert_opt(&mut query, "conversation_id", conversation_id.map(Value::from));
        insert_opt(&mut query, "since", since.map(Value::from));
        insert_opt(&mut query, "until", until.map(Value::from));
        query.insert(
            "granularity".to_string(),
            Value::from(granularity.unwrap_or("day")),
        );
        let decoded = self
            .inner
            .request(
                Method::GET,
                &format!("{phone_number_id}/conversations/analytics"),
                Some(&query),
                None,
            )
            .await?;
        Ok(decoded.into_json())
    }
}

fn require_id(conversation_id: &str) -> Result<()> {
    if conversation_id.trim().is_empty() {
        return Err(ValidationError::required("conversation_id").into());
    }
    Ok(())
}

/// Filters for listing conversations.
#[derive(Debug, Clone, Default)]
pub struct ConversationListParams {
    pub status: Option<String>,
    pub last_active_since: Option<String>,
    pub last_active_until: Option<String>,
    pub phone_number: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub fields: Option<String>,
}

impl ConversationListParams {
    fn into_query(self) -> Query {
        let mut query = Query::new();
        insert_opt(&mut query, "status", self.status);
        insert_opt(&mut query, "last_active_since", self.last_active_since);
        insert_opt(&mut query, "last_active_until", self.last_active_until);
        insert_opt(&mut query, "phone_number", self.phone_number);
        insert_opt(&mut query, "limit", self.limit);
        insert_opt(&mut query, "after", self.after);
        insert_opt(&mut query, "before", self.before);
        insert_opt(&mut query, "fields", self.fields);
        query
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[tokio::test]
    async fn list_filters_and_decodes() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(
            200,
            r#"{"data":[{"id":"c1","status":"active","phone_number":"+1"}],"paging":{"cursors":{"after":"x"}}}"#,
        );
        let params = super::ConversationListParams {
            status: Some("active".into()),
            ..Default::default()
        };
        let page = client.conversations().list("555", params).await.unwrap();
        assert_eq!(page.data[0].id.as_deref(), Some("c1"));
        let url = transport.last_request().url;
        assert!(url.path().ends_with("/555/conversations"));
        assert!(url.query_pairs().any(|(k, v)| k == "status" && v == "active"));
    }

    #[tokio::test]
    async fn get_unwraps_data_envelope() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(200, r#"{"data":{"id":"c1","status":"active"}}"#);
        let conv = client.conversations().get("c1").await.unwrap();
        assert_eq!(conv.id.as_deref(), Some("c1"));

        transport.push_json(200, r#"{"id":"c2","status":"ended"}"#);
        let conv = client.conversations().get("c2").await.unwrap();
        assert_eq!(conv.id.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn archive_patches_status() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(200, r#"{"success":true}"#);
        client.conversations().archive("c1").await.unwrap();
        let req = transport.last_request();
        assert_eq!(req.method, http::Method::PATCH);
        assert!(req.url.path().ends_with("/conversations/c1"));
        let body: serde_json::Value =
            serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["status"], "archived");
    }

    #[tokio::test]
    async fn update_status_validates_inputs() {
        let (client, _) = mock_client(proxy_config());
        assert!(client.conversations().update_status("", "active").await.is_err());
        assert!(client.conversations().update_status("c1", " ").await.is_err());
    }

    #[tokio::test]
    async fn analytics_defaults_granularity() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(200, r#"{"data":[]}"#);
        client
            .conversations()
            .analytics("555", None, None, None, None)
            .await
            .unwrap();
        let url = transport.last_request().url;
        assert!(url.query_pairs().any(|(k, v)| k == "granularity" && v == "day"));
    }
}
