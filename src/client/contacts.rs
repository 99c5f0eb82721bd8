//! Contact directory endpoints. All proxy-only.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use super::{decode, insert_opt, unwrap_data_envelope, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{Result, ValidationError};
use crate::types::{ContactRecord, PagedResult, SuccessResponse};

const FEATURE: &str = "Contacts API";

/// Contact endpoints.
pub struct Contacts {
    inner: Arc<Inner>,
}

impl Contacts {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub async fn list(
        &self,
        phone_number_id: &str,
        params: ContactListParams,
    ) -> Result<PagedResult<ContactRecord>> {
        self.inner.require_proxy(FEATURE)?;
        let query = params.into_query();
        self.inner
            .request_json(
                Method::GET,
                &format!("{phone_number_id}/contacts"),
                Some(&query),
                None,
            )
            .await
    }

    pub async fn get(&self, phone_number_id: &str, wa_id: &str) -> Result<ContactRecord> {
        self.inner.require_proxy(FEATURE)?;
        require_wa_id(wa_id)?;
        let decoded = self
            .inner
            .request(
                Method::GET,
                &format!("{phone_number_id}/contacts/{wa_id}"),
                None,
                None,
            )
            .await?;
        decode(unwrap_data_envelope(decoded.into_json()))
    }

    /// Update contact metadata. At least one attribute must be present.
    pub async fn update(
        &self,
        phone_number_id: &str,
        wa_id: &str,
        update: ContactUpdate,
    ) -> Result<SuccessResponse> {
        self.inner.require_proxy(FEATURE)?;
        require_wa_id(wa_id)?;
        let payload = update.into_payload()?;
        self.inner
            .request_json(
                Method::PATCH,
                &format!("{phone_number_id}/contacts/{wa_id}"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    /// Merge tags into the contact's metadata (read-modify-write).
    pub async fn add_tags(
        &self,
        phone_number_id: &str,
        wa_id: &str,
        tags: &[&str],
    ) -> Result<SuccessResponse> {
        if tags.is_empty() {
            return Err(ValidationError::required("tags").into());
        }
        let contact = self.get(phone_number_id, wa_id).await?;
        let mut merged = existing_tags(&contact);
        for tag in tags {
            if !merged.iter().any(|t| t == tag) {
                merged.push((*tag).to_string());
            }
        }
        self.update(
            phone_number_id,
            wa_id,
            ContactUpdate {
                metadata: Some(json!({ "tags": merged })),
                ..Default::default()
            },
        )
        .await
    }

    /// Remove tags from the contact's metadata.
    pub async fn remove_tags(
        &self,
        phone_number_id: &str,
        wa_id: &str,
        tags: &[&str],
    ) -> Result<SuccessResponse> {
        if tags.is_empty() {
            return Err(ValidationError::required("tags").into());
        }
        let contact = self.get(phone_number_id, wa_id).await?;
        let remaining: Vec<String> = existing_tags(&contact)
            .into_iter()
            .filter(|t| !tags.contains(&t.as_str()))
            .collect();
        self.update(
            phone_number_id,
            wa_id,
            ContactUpdate {
                metadata: Some(json!({ "tags": remaining })),
                ..Default::default()
            },
        )
        .await
    }

    /// Free-text contact search.
    pub async fn search(
        &self,
        phone_number_id: &str,
        query_text: &str,
        search_in: Option<&[&str]>,
        limit: Option<u32>,
    ) -> Result<PagedResult<ContactRecord>> {
        self.inner.require_proxy("Contacts Search API")?;
        if query_text.trim().is_empty() {
            return Err(ValidationError::required("query").into());
        }
        let fields = search_in.unwrap_or(&["profile_name", "phone_number"]);
        let mut query = Query::new();
        query.insert("q".to_string(), Value::from(query_text));
        query.insert("search_in".to_string(), Value::from(fields.join(",")));
        insert_opt(&mut query, "limit", limit);
        self.inner
            .request_json(
                Method::GET,
                &format!("{phone_number_id}/contacts/search"),
                Some(&query),
                None,
            )
            .await
    }

    /// Aggregated contact metrics.
    pub async fn analytics(
        &self,
        phone_number_id: &str,
        wa_id: Option<&str>,
        since: Option<&str>,
        until: Option<&str>,
        granularity: Option<&str>,
    ) -> Result<Value> {
        self.inner.require_proxy("Contact Analytics API")?;
        let mut query = Query::new();
        insert_opt(&mut query, "wa_id", wa_id.map(Value::from));
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
                &format!("{phone_number_id}/contacts/analytics"),
                Some(&query),
                None,
            )
            .await?;
        Ok(decoded.into_json())
    }

    /// Kick off a server-side contact export.
    pub async fn export(
        &self,
        phone_number_id: &str,
        format: Option<&str>,
        filters: Option<Value>,
    ) -> Result<Value> {
        self.inner.require_proxy("Contacts Export API")?;
        let mut payload = json!({ "format": format.unwrap_or("csv") });
        if let Some(filters) = filters {
            payload["filters"] = filters;
        }
        let decoded = self
            .inner
            .request(
                Method::POST,
                &format!("{phone_number_id}/contacts/export"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await?;
        Ok(decoded.into_json())
    }
}

fn require_wa_id(wa_id: &str) -> Result<()> {
    if wa_id.trim().is_empty() {
        return Err(ValidationError::required("wa_id").into());
    }
    Ok(())
}

fn existing_tags(contact: &ContactRecord) -> Vec<String> {
    contact
        .metadata
        .as_ref()
        .and_then(|m| m.get("tags"))
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Attributes of a contact update; at least one must be set.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub metadata: Option<Value>,
    pub tags: Option<Vec<String>>,
    pub customer_id: Option<String>,
    pub notes: Option<String>,
}

impl ContactUpdate {
    fn into_payload(self) -> Result<Value> {
        let mut payload = serde_json::Map::new();
        if let Some(metadata) = self.metadata {
            payload.insert("metadata".to_string(), metadata);
        }
        if let Some(tags) = self.tags {
            payload.insert("tags".to_string(), Value::from(tags));
        }
        if let Some(customer_id) = self.customer_id {
            payload.insert("customer_id".to_string(), Value::from(customer_id));
        }
        if let Some(notes) = self.notes {
            payload.insert("notes".to_string(), Value::from(notes));
        }
        if payload.is_empty() {
            return Err(ValidationError::new("no contact attributes to update").into());
        }
        Ok(Value::Object(payload))
    }
}

/// Filters for listing contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactListParams {
    pub customer_id: Option<String>,
    pub phone_number: Option<String>,
    pub profile_name: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub fields: Option<String>,
}

impl ContactListParams {
    fn into_query(self) -> Query {
        let mut query = Query::new();
        insert_opt(&mut query, "customer_id", self.customer_id);
        insert_opt(&mut query, "phone_number", self.phone_number);
        insert_opt(&mut query, "profile_name", self.profile_name);
        insert_opt(&mut query, "limit", self.limit);
        insert_opt(&mut query, "after", self.after);
        insert_opt(&mut query, "before", self.before);
        insert_opt(&mut query, "fields", self.fields);
        query
    }
}
