//! Message-template management and component helpers.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use super::{insert_opt, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{Result, ValidationError};
use crate::types::{MessageTemplate, PagedResult, SuccessResponse, TemplateCreateResponse};

/// Template category, as the review system classifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Marketing,
    Utility,
    Authentication,
    Unknown,
}

impl TemplateCategory {
    fn as_str(self) -> &'static str {
        match self {
            Self::Marketing => "MARKETING",
            Self::Utility => "UTILITY",
            Self::Authentication => "AUTHENTICATION",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template to create. Components are passed through structurally; the
/// remote review pipeline is authoritative for their contents.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub language: String,
    pub category: TemplateCategory,
    pub components: Vec<Value>,
    pub allow_category_change: Option<bool>,
    pub message_send_ttl_seconds: Option<u64>,
}

impl NewTemplate {
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        category: TemplateCategory,
        components: Vec<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            category,
            components,
            allow_category_change: None,
            message_send_ttl_seconds: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("template name cannot be empty").into());
        }
        if self.language.trim().is_empty() {
            return Err(ValidationError::new("language cannot be empty").into());
        }
        if self.components.is_empty() {
            return Err(ValidationError::new("components cannot be empty").into());
        }
        for (index, component) in self.components.iter().enumerate() {
            let has_type = component
                .as_object()
                .is_some_and(|o| o.contains_key("type"));
            if !has_type {
                return Err(ValidationError::new(format!(
                    "component at index {index} must be an object with a type key"
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Filters for listing templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateListParams {
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub name_or_content: Option<String>,
    pub quality_score: Option<String>,
}

impl TemplateListParams {
    fn into_query(self) -> Query {
        let mut query = Query::new();
        insert_opt(&mut query, "limit", self.limit);
        insert_opt(&mut query, "after", self.after);
        insert_opt(&mut query, "before", self.before);
        insert_opt(&mut query, "name", self.name);
        insert_opt(&mut query, "status", self.status);
        insert_opt(&mut query, "category", self.category);
        insert_opt(&mut query, "language", self.language);
        insert_opt(&mut query, "name_or_content", self.name_or_content);
        insert_opt(&mut query, "quality_score", self.quality_score);
        query
    }
}

/// `{business_account_id}/message_templates` endpoints.
pub struct Templates {
    inner: Arc<Inner>,
}

impl Templates {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub async fn list(
        &self,
        business_account_id: &str,
        params: TemplateListParams,
    ) -> Result<PagedResult<MessageTemplate>> {
        let query = params.into_query();
        self.inner
            .request_json(
                Method::GET,
                &format!("{business_account_id}/message_templates"),
                Some(&query),
                None,
            )
            .await
    }

    pub async fn get(
        &self,
        business_account_id: &str,
        template_id: &str,
        fields: Option<&str>,
    ) -> Result<MessageTemplate> {
        let mut query = Query::new();
        insert_opt(&mut query, "fields", fields.map(Value::from));
        self.inner
            .request_json(
                Method::GET,
                &format!("{business_account_id}/message_templates/{template_id}"),
                Some(&query),
                None,
            )
            .await
    }

    pub async fn create(
        &self,
        business_account_id: &str,
        template: NewTemplate,
    ) -> Result<TemplateCreateResponse> {
        template.validate()?;
        let mut payload = json!({
            "name": template.name,
            "language": template.language,
            "category": template.category.as_str(),
            "components": template.components,
        });
        if let Some(allow) = template.allow_category_change {
            payload["allow_category_change"] = Value::Bool(allow);
        }
        if let Some(ttl) = template.message_send_ttl_seconds {
            payload["message_send_ttl_seconds"] = Value::from(ttl);
        }
        self.inner
            .request_json(
                Method::POST,
                &format!("{business_account_id}/message_templates"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    /// Update a template's category and/or components.
    pub async fn update(
        &self,
        business_account_id: &str,
        template_id: &str,
        category: Option<TemplateCategory>,
        components: Option<Vec<Value>>,
    ) -> Result<SuccessResponse> {
        let mut payload = serde_json::Map::new();
        if let Some(category) = category {
            payload.insert("category".to_string(), Value::from(category.as_str()));
        }
        if let Some(components) = components {
            payload.insert("components".to_string(), Value::from(components));
        }
        if payload.is_empty() {
            return Err(ValidationError::new("no template attributes to update").into());
        }
        self.inner
            .request_json(
                Method::POST,
                &format!("{business_account_id}/message_templates/{template_id}"),
                None,
                Some(RequestBody::Json(Value::Object(payload))),
            )
            .await
    }

    pub async fn delete_by_id(
        &self,
        business_account_id: &str,
        template_id: &str,
    ) -> Result<SuccessResponse> {
        self.inner
            .request_json(
                Method::DELETE,
                &format!("{business_account_id}/message_templates/{template_id}"),
                None,
                None,
            )
            .await
    }

    /// Delete by name, optionally scoped to one language.
    pub async fn delete_by_name(
        &self,
        business_account_id: &str,
        name: &str,
        language: Option<&str>,
    ) -> Result<SuccessResponse> {
        if name.trim().is_empty() {
            return Err(ValidationError::required("template name").into());
        }
        let mut query = Query::new();
        query.insert("name".to_string(), Value::from(name));
        insert_opt(&mut query, "language", language.map(Value::from));
        self.inner
            .request_json(
                Method::DELETE,
                &format!("{business_account_id}/message_templates"),
                Some(&query),
                None,
            )
            .await
    }
}

/// Component builder helpers mirroring the shapes the template review
/// endpoint accepts.
pub mod components {
    use serde_json::{json, Value};

    pub fn body(text: impl Into<String>) -> Value {
        json!({ "type": "BODY", "text": text.into() })
    }

    pub fn body_with_example(text: impl Into<String>, example: Value) -> Value {
        json!({ "type": "BODY", "text": text.into(), "example": example })
    }

    pub fn text_header(text: impl Into<String>) -> Value {
        json!({ "type": "HEADER", "format": "TEXT", "text": text.into() })
    }

    /// Media header; `handle` is an uploaded asset handle used as the
    /// review example.
    pub fn media_header(format: &str, handle: impl Into<String>) -> Value {
        json!({
            "type": "HEADER",
            "format": format.to_uppercase(),
            "example": { "header_handle": [handle.into()] }
        })
    }

    pub fn footer(text: impl Into<String>) -> Value {
        json!({ "type": "FOOTER", "text": text.into() })
    }

    pub fn buttons(buttons: Vec<Value>) -> Value {
        json!({ "type": "BUTTONS", "buttons": buttons })
    }

    pub fn quick_reply_button(text: impl Into<String>) -> Value {
        json!({ "type": "QUICK_REPLY", "text": text.into() })
    }

    pub fn url_button(text: impl Into<String>, url: impl Into<String>) -> Value {
        json!({ "type": "URL", "text": text.into(), "url": url.into() })
    }

    pub fn phone_number_button(text: impl Into<String>, phone_number: impl Into<String>) -> Value {
        json!({
            "type": "PHONE_NUMBER",
            "text": text.into(),
            "phone_number": phone_number.into()
        })
    }

    pub fn otp_button(otp_type: impl Into<String>) -> Value {
        json!({ "type": "OTP", "otp_type": otp_type.into() })
    }

    /// Canned authentication template: security-recommendation body,
    /// expiry footer, copy-code button.
    pub fn authentication_components(code_expiration_minutes: u32) -> Vec<Value> {
        vec![
            json!({ "type": "BODY", "add_security_recommendation": true }),
            json!({ "type": "FOOTER", "code_expiration_minutes": code_expiration_minutes }),
            buttons(vec![otp_button("COPY_CODE")]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn list_passes_filters() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(
            200,
            r#"{"data":[{"id":"t1","name":"promo","status":"APPROVED"}],"paging":{"cursors":{"after":"a"}}}"#,
        );
        let params = TemplateListParams {
            status: Some("APPROVED".into()),
            limit: Some(10),
            ..Default::default()
        };
        let page = client.templates().list("waba-1", params).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.after_cursor(), Some("a"));
        let url = transport.last_request().url;
        assert!(url.path().ends_with("/waba-1/message_templates"));
        assert!(url.query_pairs().any(|(k, v)| k == "status" && v == "APPROVED"));
    }

    #[tokio::test]
    async fn create_validates_before_posting() {
        let (client, transport) = mock_client(direct_config());
        let no_components =
            NewTemplate::new("promo", "en_US", TemplateCategory::Marketing, vec![]);
        let err = client
            .templates()
            .create("waba-1", no_components)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));

        let bad_component = NewTemplate::new(
            "promo",
            "en_US",
            TemplateCategory::Marketing,
            vec![serde_json::json!({"text": "no type key"})],
        );
        assert!(client.templates().create("waba-1", bad_component).await.is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn create_posts_normalized_payload() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"id":"t9","status":"PENDING","category":"UTILITY"}"#);
        let template = NewTemplate::new(
            "order_update",
            "en_US",
            TemplateCategory::Utility,
            vec![components::body("Your order {{1}} shipped")],
        );
        let resp = client.templates().create("waba-1", template).await.unwrap();
        assert_eq!(resp.status.as_deref(), Some("PENDING"));
        let body: Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["category"], "UTILITY");
        assert_eq!(body["components"][0]["type"], "BODY");
    }

    #[tokio::test]
    async fn update_requires_something_to_change() {
        let (client, _) = mock_client(direct_config());
        let err = client
            .templates()
            .update("waba-1", "t1", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[tokio::test]
    async fn delete_by_name_scopes_language() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"success":true}"#);
        client
            .templates()
            .delete_by_name("waba-1", "promo", Some("en_US"))
            .await
            .unwrap();
        let req = transport.last_request();
        assert_eq!(req.method, http::Method::DELETE);
        assert!(req.url.query_pairs().any(|(k, v)| k == "name" && v == "promo"));
        assert!(req.url.query_pairs().any(|(k, v)| k == "language" && v == "en_US"));
    }

    #[test]
    fn authentication_components_shape() {
        let comps = components::authentication_components(10);
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0]["add_security_recommendation"], true);
        assert_eq!(comps[1]["code_expiration_minutes"], 10);
        assert_eq!(comps[2]["buttons"][0]["otp_type"], "COPY_CODE");
    }
}
