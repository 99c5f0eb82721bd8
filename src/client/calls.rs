//! Business calling endpoints.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use super::{insert_opt, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{Result, ValidationError};
use crate::payload::MESSAGING_PRODUCT;
use crate::types::{CallActionResponse, CallConnectResponse, CallRecord, PagedResult, SuccessResponse};

/// `{phone_number_id}/calls` endpoints.
pub struct Calls {
    inner: Arc<Inner>,
}

impl Calls {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Initiate an outbound call. `session` carries the WebRTC session
    /// description when the caller manages media itself.
    pub async fn connect(
        &self,
        phone_number_id: &str,
        to: &str,
        session: Option<Value>,
    ) -> Result<CallConnectResponse> {
        let mut payload = json!({
            "messaging_product": MESSAGING_PRODUCT,
            "to": to,
            "action": "connect",
        });
        if let Some(session) = session {
            payload["session"] = session;
        }
        self.action_request(phone_number_id, payload).await
    }

    /// Signal early media acceptance before the full accept.
    pub async fn pre_accept(
        &self,
        phone_number_id: &str,
        call_id: &str,
        session: Value,
    ) -> Result<CallActionResponse> {
        require_call_id(call_id)?;
        let payload = json!({
            "messaging_product": MESSAGING_PRODUCT,
            "call_id": call_id,
            "action": "pre_accept",
            "session": session,
        });
        self.action_request(phone_number_id, payload).await
    }

    pub async fn accept(
        &self,
        phone_number_id: &str,
        call_id: &str,
        session: Value,
    ) -> Result<CallActionResponse> {
        require_call_id(call_id)?;
        let payload = json!({
            "messaging_product": MESSAGING_PRODUCT,
            "call_id": call_id,
            "action": "accept",
            "session": session,
        });
        self.action_request(phone_number_id, payload).await
    }

    pub async fn reject(&self, phone_number_id: &str, call_id: &str) -> Result<CallActionResponse> {
        require_call_id(call_id)?;
        let payload = json!({
            "messaging_product": MESSAGING_PRODUCT,
            "call_id": call_id,
            "action": "reject",
        });
        self.action_request(phone_number_id, payload).await
    }

    pub async fn terminate(
        &self,
        phone_number_id: &str,
        call_id: &str,
    ) -> Result<CallActionResponse> {
        require_call_id(call_id)?;
        let payload = json!({
            "messaging_product": MESSAGING_PRODUCT,
            "call_id": call_id,
            "action": "terminate",
        });
        self.action_request(phone_number_id, payload).await
    }

    /// Call history. Proxy only.
    pub async fn list(
        &self,
        phone_number_id: &str,
        params: CallListParams,
    ) -> Result<PagedResult<CallRecord>> {
        self.inner.require_proxy("Call history API")?;
        let query = params.into_query();
        self.inner
            .request_json(
                Method::GET,
                &format!("{phone_number_id}/calls"),
                Some(&query),
                None,
            )
            .await
    }

    /// Details of one call. Proxy only.
    pub async fn get(
        &self,
        phone_number_id: &str,
        call_id: &str,
        fields: Option<&str>,
    ) -> Result<CallRecord> {
        self.inner.require_proxy("Call details API")?;
        let mut query = Query::new();
        insert_opt(&mut query, "fields", fields.map(Value::from));
        self.inner
            .request_json(
                Method::GET,
                &format!("{phone_number_id}/calls/{call_id}"),
                Some(&query),
                None,
            )
            .await
    }

    /// Whether a user has granted calling permission.
    pub async fn permissions(&self, phone_number_id: &str, user_wa_id: &str) -> Result<Value> {
        if user_wa_id.trim().is_empty() {
            return Err(ValidationError::required("user_wa_id").into());
        }
        let mut query = Query::new();
        query.insert("user_wa_id".to_string(), Value::from(user_wa_id));
        let decoded = self
            .inner
            .request(
                Method::GET,
                &format!("{phone_number_id}/call_permissions"),
                Some(&query),
                None,
            )
            .await?;
        Ok(decoded.into_json())
    }

    pub async fn update_permissions(
        &self,
        phone_number_id: &str,
        user_wa_id: &str,
        permission: Value,
    ) -> Result<SuccessResponse> {
        if user_wa_id.trim().is_empty() {
            return Err(ValidationError::required("user_wa_id").into());
        }
        let payload = json!({
            "user_wa_id": user_wa_id,
            "permission": permission,
        });
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/call_permissions"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    async fn action_request<T: serde::de::DeserializeOwned>(
        &self,
        phone_number_id: &str,
        payload: Value,
    ) -> Result<T> {
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/calls"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }
}

fn require_call_id(call_id: &str) -> Result<()> {
    if call_id.trim().is_empty() {
        return Err(ValidationError::required("call_id").into());
    }
    Ok(())
}

/// Filters for the proxy call-history endpoint.
#[derive(Debug, Clone, Default)]
pub struct CallListParams {
    pub direction: Option<String>,
    pub status: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub call_id: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub fields: Option<String>,
}

impl CallListParams {
    fn into_query(self) -> Query {
        let mut query = Query::new();
        insert_opt(&mut query, "direction", self.direction);
        insert_opt(&mut query, "status", self.status);
        insert_opt(&mut query, "since", self.since);
        insert_opt(&mut query, "until", self.until);
        insert_opt(&mut query, "call_id", self.call_id);
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
    use super::*;

    #[tokio::test]
    async fn connect_posts_action_payload() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(
            200,
            r#"{"messaging_product":"whatsapp","calls":[{"id":"call-1"}]}"#,
        );
        let resp = client.calls().connect("555", "+1", None).await.unwrap();
        assert_eq!(resp.calls.len(), 1);
        let body: Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["action"], "connect");
        assert_eq!(body["to"], "+1");
    }

    #[tokio::test]
    async fn accept_requires_call_id() {
        let (client, transport) = mock_client(direct_config());
        let err = client
            .calls()
            .accept("555", " ", json!({"sdp": "..."}))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn terminate_payload_shape() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"success":true,"messaging_product":"whatsapp"}"#);
        let resp = client.calls().terminate("555", "call-1").await.unwrap();
        assert!(resp.success);
        let body: Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["action"], "terminate");
        assert_eq!(body["call_id"], "call-1");
    }

    #[tokio::test]
    async fn list_is_proxy_only() {
        let (client, _) = mock_client(direct_config());
        let err = client
            .calls()
            .list("555", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::ProxyRequired(_)));
    }

    #[tokio::test]
    async fn list_decodes_records() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(
            200,
            r#"{"data":[{"id":"call-1","direction":"inbound","status":"completed","duration_seconds":42}],"paging":{"cursors":{}}}"#,
        );
        let page = client
            .calls()
            .list("555", CallListParams { status: Some("completed".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.data[0].duration_seconds, Some(42));
    }
}
