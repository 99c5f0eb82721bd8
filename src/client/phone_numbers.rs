//! Phone-number registration and verification endpoints.

use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use super::{insert_opt, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{Result, ValidationError};
use crate::payload::MESSAGING_PRODUCT;
use crate::types::SuccessResponse;

/// Delivery channel for the verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMethod {
    Sms,
    Voice,
}

impl CodeMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Voice => "VOICE",
        }
    }
}

/// Phone-number endpoints.
pub struct PhoneNumbers {
    inner: Arc<Inner>,
}

impl PhoneNumbers {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Request a verification code for the number.
    pub async fn request_code(
        &self,
        phone_number_id: &str,
        method: CodeMethod,
        language: Option<&str>,
    ) -> Result<SuccessResponse> {
        let payload = json!({
            "code_method": method.as_str(),
            "language": language.unwrap_or("en_US"),
        });
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/request_code"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    /// Submit the received verification code.
    pub async fn verify_code(&self, phone_number_id: &str, code: &str) -> Result<SuccessResponse> {
        if code.trim().is_empty() {
            return Err(ValidationError::required("verification code").into());
        }
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/verify_code"),
                None,
                Some(RequestBody::Json(json!({ "code": code }))),
            )
            .await
    }

    /// Register the number for Cloud API messaging.
    pub async fn register(
        &self,
        phone_number_id: &str,
        pin: &str,
        data_localization_region: Option<&str>,
    ) -> Result<SuccessResponse> {
        if pin.trim().is_empty() {
            return Err(ValidationError::required("pin").into());
        }
        let mut payload = json!({ "pin": pin });
        if let Some(region) = data_localization_region {
            payload["data_localization_region"] = Value::from(region);
        }
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/register"),
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }

    pub async fn deregister(&self, phone_number_id: &str) -> Result<SuccessResponse> {
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/deregister"),
                None,
                Some(RequestBody::Json(json!({}))),
            )
            .await
    }

    /// Raw phone-number details, optionally narrowed to specific fields.
    pub async fn get(&self, phone_number_id: &str, fields: Option<&str>) -> Result<Value> {
        let mut query = Query::new();
        insert_opt(&mut query, "fields", fields.map(Value::from));
        let decoded = self
            .inner
            .request(Method::GET, phone_number_id, Some(&query), None)
            .await?;
        Ok(decoded.into_json())
    }

    /// Update webhook or application settings for the number.
    pub async fn update_settings(
        &self,
        phone_number_id: &str,
        webhooks: Option<Value>,
        application: Option<Value>,
    ) -> Result<SuccessResponse> {
        let mut payload = json!({ "messaging_product": MESSAGING_PRODUCT });
        if let Some(webhooks) = webhooks {
            payload["webhooks"] = webhooks;
        }
        if let Some(application) = application {
            payload["application"] = application;
        }
        self.inner
            .request_json(
                Method::POST,
                phone_number_id,
                None,
                Some(RequestBody::Json(payload)),
            )
            .await
    }
}
