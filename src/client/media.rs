//! Media upload, metadata, and download endpoints.

use std::sync::Arc;

use base64::Engine as _;
use bytes::Bytes;
use http::Method;
use serde_json::Value;
use url::Url;

use super::{insert_opt, Inner, RequestBody};
use crate::endpoint::Query;
use crate::error::{ApiError, Error, Result, ValidationError};
use crate::payload::MESSAGING_PRODUCT;
use crate::transport::MultipartForm;
use crate::types::{MediaMetadata, MediaUploadResponse, SuccessResponse};

/// Media kinds accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Audio,
    Video,
    Document,
    Sticker,
}

impl MediaType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
            Self::Sticker => "sticker",
        }
    }

    /// Fallback MIME type when the caller supplies none.
    fn default_mime_type(self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Audio => "audio/mpeg",
            Self::Video => "video/mp4",
            Self::Document => "application/pdf",
            Self::Sticker => "image/webp",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-memory media asset to upload. Reading local files is the
/// caller's business.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub media_type: MediaType,
    pub filename: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl MediaUpload {
    pub fn new(media_type: MediaType, filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type,
            filename: filename.into(),
            mime_type: None,
            data,
        }
    }

    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Authentication strategy for media downloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DownloadAuth {
    /// Authenticate only against the direct API host, not CDNs.
    #[default]
    Auto,
    Always,
    Never,
}

/// Media endpoints.
pub struct Media {
    inner: Arc<Inner>,
}

impl Media {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Upload a media asset, returning its id for later sends.
    pub async fn upload(
        &self,
        phone_number_id: &str,
        upload: MediaUpload,
    ) -> Result<MediaUploadResponse> {
        if upload.data.is_empty() {
            return Err(ValidationError::required("media data").into());
        }
        let mime_type = upload
            .mime_type
            .clone()
            .unwrap_or_else(|| upload.media_type.default_mime_type().to_string());
        let form = MultipartForm::new()
            .text("messaging_product", MESSAGING_PRODUCT)
            .text("type", upload.media_type.as_str())
            .file("file", upload.filename, mime_type, upload.data);
        self.inner
            .request_json(
                Method::POST,
                &format!("{phone_number_id}/media"),
                None,
                Some(RequestBody::Multipart(form)),
            )
            .await
    }

    /// Fetch media metadata (including the short-lived download URL).
    ///
    /// The proxy needs `phone_number_id` to scope the lookup.
    pub async fn get(
        &self,
        media_id: &str,
        phone_number_id: Option<&str>,
    ) -> Result<MediaMetadata> {
        let query = self.scope_query(phone_number_id)?;
        self.inner
            .request_json(Method::GET, media_id, Some(&query), None)
            .await
    }

    pub async fn delete(
        &self,
        media_id: &str,
        phone_number_id: Option<&str>,
    ) -> Result<SuccessResponse> {
        let query = self.scope_query(phone_number_id)?;
        self.inner
            .request_json(Method::DELETE, media_id, Some(&query), None)
            .await
    }

    /// Download media content. Looks up the metadata first, then fetches
    /// the returned URL.
    pub async fn download(
        &self,
        media_id: &str,
        phone_number_id: Option<&str>,
        auth: DownloadAuth,
    ) -> Result<Bytes> {
        let metadata = self.get(media_id, phone_number_id).await?;
        let download_url = metadata
            .url
            .ok_or_else(|| anyhow::anyhow!("media metadata for {media_id} carries no url"))?;
        let with_auth = match auth {
            DownloadAuth::Auto => download_url.contains("graph.facebook.com"),
            DownloadAuth::Always => true,
            DownloadAuth::Never => false,
        };
        let url = Url::parse(&download_url)
            .map_err(|_| anyhow::anyhow!("media download url is invalid: {download_url}"))?;

        let response = self.inner.fetch_raw(url, with_auth).await?;
        if !response.is_success() {
            return Err(Error::Api(ApiError::from_response(
                response.status.as_u16(),
                &response.headers,
                &response.body,
            )));
        }
        Ok(Bytes::from(response.body))
    }

    /// Download and base64-encode, for callers embedding the content.
    pub async fn download_base64(
        &self,
        media_id: &str,
        phone_number_id: Option<&str>,
        auth: DownloadAuth,
    ) -> Result<String> {
        let bytes = self.download(media_id, phone_number_id, auth).await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    fn scope_query(&self, phone_number_id: Option<&str>) -> Result<Query> {
        if self.inner.config().is_proxy() && phone_number_id.is_none() {
            return Err(
                ValidationError::new("phone_number_id is required when using the proxy").into(),
            );
        }
        let mut query = Query::new();
        insert_opt(
            &mut query,
            "phone_number_id",
            phone_number_id.map(Value::from),
        );
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn upload_sends_multipart_with_product_and_type() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"id":"media-1"}"#);
        let resp = client
            .media()
            .upload(
                "555",
                MediaUpload::new(MediaType::Image, "photo.jpg", vec![1, 2, 3]),
            )
            .await
            .unwrap();
        assert_eq!(resp.id.as_deref(), Some("media-1"));
        let req = transport.last_request();
        assert!(req.url.path().ends_with("/555/media"));
        let content_type = req
            .headers
            .get(http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        assert!(body.contains("name=\"messaging_product\""));
        assert!(body.contains("whatsapp"));
        assert!(body.contains("name=\"type\""));
        assert!(body.contains("filename=\"photo.jpg\""));
        // Default MIME type for images.
        assert!(body.contains("Content-Type: image/jpeg"));
    }

    #[tokio::test]
    async fn upload_rejects_empty_data() {
        let (client, transport) = mock_client(direct_config());
        let err = client
            .media()
            .upload("555", MediaUpload::new(MediaType::Image, "x.jpg", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn get_requires_phone_number_id_on_proxy() {
        let (client, transport) = mock_client(proxy_config());
        let err = client.media().get("media-1", None).await.unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
        assert_eq!(transport.request_count(), 0);

        transport.push_json(200, r#"{"id":"media-1","url":"https://cdn/x"}"#);
        let meta = client.media().get("media-1", Some("555")).await.unwrap();
        assert_eq!(meta.id.as_deref(), Some("media-1"));
        let url = transport.last_request().url;
        assert!(url.query_pairs().any(|(k, v)| k == "phone_number_id" && v == "555"));
    }

    #[tokio::test]
    async fn download_skips_auth_for_cdn_urls() {
        let (client, transport) = mock_client(direct_config());
        // Metadata lookup, then the CDN fetch.
        transport.push_json(
            200,
            r#"{"id":"m1","url":"https://cdn.example.net/file.jpg"}"#,
        );
        transport.push_response(Ok(crate::transport::HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            vec![0xFF, 0xD8],
        )));
        let bytes = client
            .media()
            .download("m1", None, DownloadAuth::Auto)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), &[0xFF, 0xD8]);
        let fetch = transport.last_request();
        assert_eq!(fetch.url.as_str(), "https://cdn.example.net/file.jpg");
        assert!(fetch.headers.get(http::header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn download_authenticates_against_api_host() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(
            200,
            r#"{"id":"m1","url":"https://graph.facebook.com/v24.0/dl/abc"}"#,
        );
        transport.push_response(Ok(crate::transport::HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"data".to_vec(),
        )));
        client
            .media()
            .download("m1", None, DownloadAuth::Auto)
            .await
            .unwrap();
        let fetch = transport.last_request();
        assert!(fetch.headers.get(http::header::AUTHORIZATION).is_some());
    }

    #[tokio::test]
    async fn failed_download_is_classified() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"id":"m1","url":"https://cdn.example.net/x"}"#);
        transport.push_response(Ok(crate::transport::HttpResponse::new(
            http::StatusCode::FORBIDDEN,
            http::HeaderMap::new(),
            b"denied".to_vec(),
        )));
        let err = client
            .media()
            .download("m1", None, DownloadAuth::Never)
            .await
            .unwrap_err();
        let api = err.as_api_error().unwrap();
        assert_eq!(api.http_status, 403);
        assert_eq!(api.category, crate::error::ErrorCategory::Permission);
    }

    #[tokio::test]
    async fn download_base64_encodes() {
        let (client, transport) = mock_client(direct_config());
        transport.push_json(200, r#"{"id":"m1","url":"https://cdn.example.net/x"}"#);
        transport.push_response(Ok(crate::transport::HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"hi".to_vec(),
        )));
        let encoded = client
            .media()
            .download_base64("m1", None, DownloadAuth::Never)
            .await
            .unwrap();
        assert_eq!(encoded, "aGk=");
    }
}
