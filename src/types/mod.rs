//! Typed response structures.
//!
//! Every endpoint decodes into an explicit struct. Decoding is defensive:
//! fields the server omits become `None`/defaults instead of errors.

use serde::Deserialize;
use serde_json::Value;

fn default_true() -> bool {
    true
}

/// Response to sending any outbound message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendMessageResponse {
    pub messaging_product: Option<String>,
    pub contacts: Vec<MessageContact>,
    pub messages: Vec<MessageInfo>,
}

impl SendMessageResponse {
    /// Id of the first accepted message, the common case.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().and_then(|m| m.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageContact {
    pub input: Option<String>,
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageInfo {
    pub id: Option<String>,
    pub message_status: Option<String>,
}

/// Generic `{"success": true}` acknowledgement; an empty body counts as
/// success too.
#[derive(Debug, Clone, Deserialize)]
pub struct SuccessResponse {
    #[serde(default = "default_true")]
    pub success: bool,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaUploadResponse {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaMetadata {
    pub id: Option<String>,
    pub messaging_product: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub sha256: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageTemplate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub components: Option<Value>,
    pub quality_score_category: Option<String>,
    pub warnings: Option<Value>,
    pub previous_category: Option<String>,
    pub library_template_name: Option<String>,
    pub last_updated_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateCreateResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Cursor pair of a paged listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageCursors {
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub cursors: PageCursors,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Envelope of every list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, bound = "T: Deserialize<'de>")]
pub struct PagedResult<T> {
    pub data: Vec<T>,
    pub paging: Paging,
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            paging: Paging::default(),
        }
    }
}

impl<T> PagedResult<T> {
    pub fn before_cursor(&self) -> Option<&str> {
        self.paging.cursors.before.as_deref()
    }

    pub fn after_cursor(&self) -> Option<&str> {
        self.paging.cursors.after.as_deref()
    }
}

/// A conversation as tracked by the proxy service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationRecord {
    pub id: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_id: Option<String>,
    pub status: Option<String>,
    pub last_active_at: Option<String>,
    pub metadata: Option<Value>,
}

/// A contact as tracked by the proxy service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRecord {
    pub wa_id: Option<String>,
    pub phone_number: Option<String>,
    pub profile_name: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallRecord {
    pub id: Option<String>,
    pub direction: Option<String>,
    pub status: Option<String>,
    pub duration_seconds: Option<u64>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub whatsapp_conversation_id: Option<String>,
    pub whatsapp_contact_id: Option<String>,
}

/// Response to initiating a call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallConnectResponse {
    pub messaging_product: Option<String>,
    pub calls: Vec<Value>,
}

/// Acknowledgement of a call action (accept, reject, terminate).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallActionResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    pub messaging_product: Option<String>,
}

impl Default for CallActionResponse {
    fn default() -> Self {
        Self {
            success: true,
            messaging_product: None,
        }
    }
}

/// A flow as returned by the flow management endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlowSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub categories: Option<Vec<String>>,
    pub json_version: Option<String>,
    pub endpoint_uri: Option<String>,
    pub validation_errors: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_message_response_decodes() {
        let v = json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "+1234567890", "wa_id": "1234567890"}],
            "messages": [{"id": "wamid.abc", "message_status": "accepted"}]
        });
        let resp: SendMessageResponse = serde_json::from_value(v).unwrap();
        assert_eq!(resp.message_id(), Some("wamid.abc"));
        assert_eq!(resp.contacts[0].wa_id.as_deref(), Some("1234567890"));
    }

    #[test]
    fn missing_fields_become_defaults() {
        let resp: SendMessageResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.messages.is_empty());
        assert!(resp.message_id().is_none());
    }

    #[test]
    fn success_defaults_to_true_on_empty_body() {
        let resp: SuccessResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.success);
        let resp: SuccessResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn paged_result_exposes_cursors() {
        let v = json!({
            "data": [{"wa_id": "1"}, {"wa_id": "2"}],
            "paging": {"cursors": {"before": "b", "after": "a"}, "next": "https://next"}
        });
        let page: PagedResult<ContactRecord> = serde_json::from_value(v).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.before_cursor(), Some("b"));
        assert_eq!(page.after_cursor(), Some("a"));
        assert_eq!(page.paging.next.as_deref(), Some("https://next"));
    }

    #[test]
    fn paged_result_tolerates_missing_paging() {
        let page: PagedResult<Value> = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(page.data.is_empty());
        assert!(page.after_cursor().is_none());
    }

    #[test]
    fn template_decodes_with_unknown_fields_ignored() {
        let v = json!({
            "id": "t1",
            "name": "promo",
            "status": "APPROVED",
            "category": "MARKETING",
            "rejection_reason": "NONE"
        });
        let t: MessageTemplate = serde_json::from_value(v).unwrap();
        assert_eq!(t.status.as_deref(), Some("APPROVED"));
    }
}
