//! Flow management endpoints (create, publish, assets). The encrypted
//! flow data-exchange channel is out of scope; these endpoints only manage
//! flow definitions.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use super::{insert_opt, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{Result, ValidationError};
use crate::payload::MESSAGING_PRODUCT;
use crate::types::{FlowSummary, PagedResult, SuccessResponse};

/// Flow endpoints.
pub struct Flows {
    inner: Arc<Inner>,
}

impl Flows {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Create a flow under a business account.
    pub async fn create(
        &self,
        business_account_id: &str,
        name: &str,
        categories: Option<&[&str]>,
        endpoint_uri: Option<&str>,
    ) -> Result<FlowSummary> {
        if name.trim().is_empty() {
            return Err(ValidationError::required("flow name").into());
        }
        let categories = categories.unwrap_or(&["OTHER"]);
        let mut payload = json!({
            "name": name,
            "categories": categories,
        });
        if let Some(endpoint_uri) = endpoint_uri {
            payload["endpoint_uri"] = Value::from(endpoint_uri);
        }
        self.inner
            .request_json(
                Method::POST,
                &format!("{business_account_id}/flows"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    /// Update flow attributes. At least one must be present.
    pub async fn update(&self, flow_id: &str, update: FlowUpdate) -> Result<FlowSummary> {
        let payload = update.into_payload()?;
        self.inner
            .request_json(Method::POST, flow_id, None, Some(RequestBody::Json(payload)))
            .await
    }

    pub async fn delete(&self, flow_id: &str) -> Result<SuccessResponse> {
        self.inner
            .request_json(Method::DELETE, flow_id, None, None)
            .await
    }

    pub async fn get(&self, flow_id: &str, fields: Option<&[&str]>) -> Result<FlowSummary> {
        let mut query = Query::new();
        insert_opt(&mut query, "fields", fields.map(|f| Value::from(f.join(","))));
        self.inner
            .request_json(Method::GET, flow_id, Some(&query), None)
            .await
    }

    pub async fn list(
        &self,
        business_account_id: &str,
        fields: Option<&[&str]>,
    ) -> Result<PagedResult<FlowSummary>> {
        let mut query = Query::new();
        insert_opt(&mut query, "fields", fields.map(|f| Value::from(f.join(","))));
        self.inner
            .request_json(
                Method::GET,
                &format!("{business_account_id}/flows"),
                Some(&query),
                None,
            )
            .await
    }

    /// Publish the current draft version.
    pub async fn publish(&self, flow_id: &str) -> Result<SuccessResponse> {
        self.inner
            .request_json(
                Method::POST,
                &format!("{flow_id}/publish"),
                None,
                Some(RequestBody::Json(json!({}))),
            )
            .await
    }

    /// Deprecate a published flow.
    pub async fn deprecate(&self, flow_id: &str) -> Result<SuccessResponse> {
        self.inner
            .request_json(
                Method::POST,
                &format!("{flow_id}/deprecate"),
                None,
                Some(RequestBody::Json(json!({}))),
            )
            .await
    }

    /// Upload or replace the flow JSON definition. Returns the asset
    /// response including validation errors.
    pub async fn update_asset(&self, flow_id: &str, flow_json: &Value) -> Result<Value> {
        let payload = json!({
            "messaging_product": MESSAGING_PRODUCT,
            "asset_type": "FLOW_JSON",
            "asset": flow_json.to_string(),
        });
        let decoded = self
            .inner
            .request(
                Method::POST,
                &format!("{flow_id}/assets"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await?;
        Ok(decoded.into_json())
    }

    /// Fetch a web preview URL for the flow.
    pub async fn preview(&self, flow_id: &str) -> Result<Value> {
        let mut query = Query::new();
        query.insert(
            "fields".to_string(),
            Value::from("preview.preview_url,preview.expires_at"),
        );
        let decoded = self
            .inner
            .request(Method::GET, flow_id, Some(&query), None)
            .await?;
        Ok(decoded.into_json())
    }
}

/// Attributes of a flow update; at least one must be set.
#[derive(Debug, Clone, Default)]
pub struct FlowUpdate {
    pub name: Option<String>,
    pub categories: Option<Vec<String>>,
    pub endpoint_uri: Option<String>,
    pub application_id: Option<String>,
}

impl FlowUpdate {
    fn into_payload(self) -> Result<Value> {
        let mut payload = serde_json::Map::new();
        if let Some(name) = self.name {
            payload.insert("name".to_string(), Value::from(name));
        }
        if let Some(categories) = self.categories {
            payload.insert("categories".to_string(), Value::from(categories));
        }
        if let Some(endpoint_uri) = self.endpoint_uri {
            payload.insert("endpoint_uri".to_string(), Value::from(endpoint_uri));
        }
        if let Some(application_id) = self.application_id {
            payload.insert("application_id".to_string(), Value::from(application_id));
        }
        if payload.is_empty() {
            return Err(ValidationError::new("no flow attributes to update").into());
        }
        Ok(Value::Object(payload))
    }
}
