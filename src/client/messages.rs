//! Message sending and message-history endpoints.

use std::sync::Arc;

use http::Method;
use serde_json::Value;

use super::{insert_opt, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::Result;
use crate::payload::{
    AudioMessage, ButtonsMessage, CatalogMessage, ContactsMessage, CtaUrlMessage, DocumentMessage,
    FlowMessage, ImageMessage, ListMessage, LocationMessage, LocationRequestMessage,
    MessagePayload, ReactionMessage, StickerMessage, TemplateMessage, TextMessage, VideoMessage,
    MESSAGING_PRODUCT,
};
use crate::types::{PagedResult, SendMessageResponse, SuccessResponse};

/// `{phone_number_id}/messages` endpoints.
pub struct Messages {
    inner: Arc<Inner>,
}

impl Messages {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Send an already-built message payload.
    pub async fn send(
        &self,
        phone_number_id: &str,
        payload: &MessagePayload,
    ) -> Result<SendMessageResponse> {
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/messages"),
                None,
                Some(RequestBody::Json(payload.to_value())),
            )
            .await
    }

    pub async fn send_text(
        &self,
        phone_number_id: &str,
        message: TextMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_image(
        &self,
        phone_number_id: &str,
        message: ImageMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_audio(
        &self,
        phone_number_id: &str,
        message: AudioMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_video(
        &self,
        phone_number_id: &str,
        message: VideoMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_document(
        &self,
        phone_number_id: &str,
        message: DocumentMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_sticker(
        &self,
        phone_number_id: &str,
        message: StickerMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_location(
        &self,
        phone_number_id: &str,
        message: LocationMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_contacts(
        &self,
        phone_number_id: &str,
        message: ContactsMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_template(
        &self,
        phone_number_id: &str,
        message: TemplateMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_reaction(
        &self,
        phone_number_id: &str,
        message: ReactionMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_interactive_buttons(
        &self,
        phone_number_id: &str,
        message: ButtonsMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_interactive_list(
        &self,
        phone_number_id: &str,
        message: ListMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_interactive_cta_url(
        &self,
        phone_number_id: &str,
        message: CtaUrlMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_interactive_catalog(
        &self,
        phone_number_id: &str,
        message: CatalogMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_interactive_location_request(
        &self,
        phone_number_id: &str,
        message: LocationRequestMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    pub async fn send_flow(
        &self,
        phone_number_id: &str,
        message: FlowMessage,
    ) -> Result<SendMessageResponse> {
        self.send(phone_number_id, &message.build()?).await
    }

    /// Mark an inbound message as read.
    pub async fn mark_read(
        &self,
        phone_number_id: &str,
        message_id: &str,
    ) -> Result<SuccessResponse> {
        let payload = serde_json::json!({
            "messaging_product": MESSAGING_PRODUCT,
            "status": "read",
            "message_id": message_id,
        });
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/messages"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    /// Show a typing indicator in the recipient's chat.
    pub async fn send_typing_indicator(
        &self,
        phone_number_id: &str,
        to: &str,
    ) -> Result<SuccessResponse> {
        let payload = serde_json::json!({
            "messaging_product": MESSAGING_PRODUCT,
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "typing_indicator": { "type": "text" } },
        });
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/messages"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    /// Query message history. Proxy only.
    pub async fn query(
        &self,
        phone_number_id: &str,
        params: MessageQuery,
    ) -> Result<PagedResult<Value>> {
        self.inner.require_proxy("Message history API")?;
        let query = params.into_query(phone_number_id);
        self.inner
            .request_json(
                Method::GET,
                &format!("{phone_number_id}/messages"),
                Some(&query),
                None,
            )
            .await
    }

    /// List messages belonging to one conversation. Proxy only.
    pub async fn list_by_conversation(
        &self,
        phone_number_id: &str,
        conversation_id: &str,
        params: MessageQuery,
    ) -> Result<PagedResult<Value>> {
        let params = MessageQuery {
            conversation_id: Some(conversation_id.to_string()),
            ..params
        };
        self.query(phone_number_id, params).await
    }
}

/// Filters for the proxy message-history endpoint.
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub direction: Option<String>,
    pub status: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub conversation_id: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub fields: Option<String>,
}

impl MessageQuery {
    fn into_query(self, phone_number_id: &str) -> Query {
        let mut query = Query::new();
        query.insert(
            "phone_number_id".to_string(),
            Value::String(phone_number_id.to_string()),
        );
        insert_opt(&mut query, "direction", self.direction);
        insert_opt(&mut query, "status", self.status);
        insert_opt(&mut query, "since", self.since);
        insert_opt(&mut query, "until", self.until);
        insert_opt(&mut query, "conversation_id", self.conversation_id);
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
    use crate::payload::{MediaRef, ReplyButton, TextMessage};

    #[tokio::test]
    async fn send_text_posts_to_messages_path() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(
            200,
            r#"{"messaging_product":"whatsapp","messages":[{"id":"wamid.X"}]}"#,
        );
        let resp = client
            .messages()
            .send_text("555", TextMessage::new("+1234567890", "Hello"))
            .await
            .unwrap();
        assert_eq!(resp.message_id(), Some("wamid.X"));
        let req = transport.last_request();
        assert_eq!(req.method, http::Method::POST);
        assert!(req.url.path().ends_with("/555/messages"));
        let body: serde_json::Value =
            serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "+1234567890",
                "type": "text",
                "text": {"body": "Hello"}
            })
        );
    }

    #[tokio::test]
    async fn send_buttons_round_trip() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"messages":[{"id":"wamid.B"}]}"#);
        client
            .messages()
            .send_interactive_buttons(
                "555",
                crate::payload::ButtonsMessage::new(
                    "+1",
                    "pick one",
                    vec![ReplyButton::new("a", "A"), ReplyButton::new("b", "B")],
                ),
            )
            .await
            .unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["type"], "interactive");
        assert_eq!(body["interactive"]["action"]["buttons"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn send_image_with_parsed_media_ref() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, "{}");
        client
            .messages()
            .send_image(
                "555",
                crate::payload::ImageMessage::new("+1", MediaRef::parse("9981723")),
            )
            .await
            .unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["image"], serde_json::json!({"id": "9981723"}));
    }

    #[tokio::test]
    async fn mark_read_payload() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"success":true}"#);
        let resp = client.messages().mark_read("555", "wamid.abc").await.unwrap();
        assert!(resp.success);
        let body: serde_json::Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["status"], "read");
        assert_eq!(body["message_id"], "wamid.abc");
    }

    #[tokio::test]
    async fn typing_indicator_payload() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"success":true}"#);
        client
            .messages()
            .send_typing_indicator("555", "+1")
            .await
            .unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"]["typing_indicator"]["type"], "text");
    }

    #[tokio::test]
    async fn history_query_requires_proxy() {
        let (client, _) = mock_client(direct_config());
        let err = client
            .messages()
            .query("555", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::ProxyRequired(_)));
    }

    #[tokio::test]
    async fn history_query_flattens_filters() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(200, r#"{"data":[],"paging":{"cursors":{}}}"#);
        let params = super::MessageQuery {
            direction: Some("inbound".into()),
            limit: Some(25),
            ..Default::default()
        };
        client.messages().query("555", params).await.unwrap();
        let url = transport.last_request().url;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("phone_number_id".into(), "555".into())));
        assert!(pairs.contains(&("direction".into(), "inbound".into())));
        assert!(pairs.contains(&("limit".into(), "25".into())));
    }

    #[tokio::test]
    async fn list_by_conversation_pins_the_conversation() {
        let (client, transport) = mock_client(proxy_config());
        transport.push_json(200, r#"{"data":[]}"#);
        client
            .messages()
            .list_by_conversation("555", "conv-9", Default::default())
            .await
            .unwrap();
        let url = transport.last_request().url;
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "conversation_id" && v == "conv-9"));
    }
}
