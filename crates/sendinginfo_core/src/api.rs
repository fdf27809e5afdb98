//! Async HTTP client for the share service.
//!
//! One method per endpoint. JSON endpoints (`/create_paste`, `/upload`,
//! `/feedback`) report an application error whenever the body carries an
//! `error` field, whatever the status code; `/download` judges by status
//! alone because a successful payload may itself be JSON.

use crate::config::ClientConfig;
use crate::constants::AGREED_TERMS_VALUE;
use crate::disposition::filename_from_content_disposition;
use crate::error::ClientError;
use crate::models::feedback::{FeedbackAccepted, FeedbackRequest};
use crate::models::health::HealthStatus;
use crate::models::paste::{CreatePasteRequest, PasteCreated};
use crate::models::transfer::{DownloadedFile, UploadReceipt, UploadRequest};
use crate::text::normalize_server;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Endpoint URLs of one share service deployment.
///
/// Path segments are pushed percent-encoded, so a code can never escape its
/// slot in the path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Validate `server` as an API base.
    ///
    /// # Returns
    /// The endpoint set, or a message naming why `server` cannot act as a base.
    pub fn new(server: &str) -> Result<Self, String> {
        let normalized = normalize_server(server);
        let base = Url::parse(&normalized)
            .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
        if base.cannot_be_a_base() {
            return Err("Server URL cannot be used as an API base".to_string());
        }
        Ok(Self { base })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Append `segments` to the base path.
    pub fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Infallible: `new` rejected cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    /// Formatted paste page for `code`.
    pub fn view_url(&self, code: &str) -> Url {
        self.join(&["view", code])
    }

    /// Raw-text paste for `code`.
    pub fn raw_url(&self, code: &str) -> Url {
        self.join(&["raw", code])
    }

    /// Download endpoint for an uploaded file's `code`.
    pub fn download_url(&self, code: &str) -> Url {
        self.join(&["download", code])
    }
}

/// Message a server put in an error body, if it put one there.
///
/// JSON bodies contribute their `error` field; plain-text bodies are
/// taken verbatim. Empty bodies, JSON without `error`, and HTML pages yield
/// `None` so callers can substitute their own fallback.
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => error_field(&value),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// Interpret a JSON endpoint's reply under the "any `error` field wins" contract.
fn interpret_json<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    let parsed = serde_json::from_str::<Value>(body);
    if let Ok(value) = &parsed {
        if let Some(message) = error_field(value) {
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message: Some(message),
            });
        }
    }
    if !status.is_success() {
        return Err(ClientError::Remote {
            status: status.as_u16(),
            message: server_message(body),
        });
    }
    let value = parsed.map_err(|err| ClientError::Decode(err.to_string()))?;
    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

/// HTTP client bound to one share service base URL.
#[derive(Clone, Debug)]
pub struct ShareClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ShareClient {
    /// Create a client for `server_url` with a per-request `timeout`.
    ///
    /// # Errors
    /// [`ClientError::InvalidUrl`] when the URL cannot serve as an API base,
    /// [`ClientError::Transport`] when the HTTP stack fails to initialize.
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoints = Endpoints::new(server_url).map_err(ClientError::InvalidUrl)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoints })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.server_url, config.timeout())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        interpret_json(status, &body)
    }

    /// `POST /create_paste`.
    pub async fn create_paste(
        &self,
        request: &CreatePasteRequest,
    ) -> Result<PasteCreated, ClientError> {
        let url = self.endpoints.join(&["create_paste"]);
        debug!(lang = %request.lang, max_views = request.max_views, "creating paste");
        let response = self.http.post(url).json(request).send().await?;
        let created: PasteCreated = self.read_json(response).await?;
        info!(code = %created.code, "paste created");
        Ok(created)
    }

    /// `POST /upload` with the file read from `path`.
    pub async fn upload_file(
        &self,
        path: &Path,
        request: &UploadRequest,
    ) -> Result<UploadReceipt, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        self.upload_bytes(&file_name, bytes, request).await
    }

    /// `POST /upload` with an in-memory payload.
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        request: &UploadRequest,
    ) -> Result<UploadReceipt, ClientError> {
        let url = self.endpoints.join(&["upload"]);
        let size = bytes.len();
        let agreed = if request.agreed_terms {
            AGREED_TERMS_VALUE
        } else {
            "false"
        };
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("max_downloads", request.max_downloads.to_string())
            .text("agreed_terms", agreed);
        debug!(file_name, size, max_downloads = request.max_downloads, "uploading file");
        let response = self.http.post(url).multipart(form).send().await?;
        let receipt: UploadReceipt = self.read_json(response).await?;
        info!(code = %receipt.code, "file uploaded");
        Ok(receipt)
    }

    /// `GET /download/{code}`.
    ///
    /// # Errors
    /// [`ClientError::Remote`] for any non-success status, carrying the
    /// body's `error` field when present.
    pub async fn download(&self, code: &str) -> Result<DownloadedFile, ClientError> {
        let url = self.endpoints.download_url(code);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        let header_str = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let file_name = filename_from_content_disposition(header_str(CONTENT_DISPOSITION).as_deref());
        let content_type = header_str(CONTENT_TYPE);
        let bytes = response.bytes().await?.to_vec();
        info!(code, file_name = %file_name, size = bytes.len(), "file downloaded");
        Ok(DownloadedFile {
            file_name,
            content_type,
            bytes,
        })
    }

    /// `POST /feedback` as an urlencoded form.
    pub async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackAccepted, ClientError> {
        let url = self.endpoints.join(&["feedback"]);
        let response = self.http.post(url).form(request).send().await?;
        self.read_json(response).await
    }

    /// `GET /healthz`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.endpoints.join(&["healthz"]);
        let response = self.http.get(url).send().await?;
        self.read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_matrix_covers_encoding_and_base_path_append() {
        let cases = [
            (
                "http://127.0.0.1:5000",
                vec!["download", "id/with?reserved#chars"],
                "http://127.0.0.1:5000/download/id%2Fwith%3Freserved%23chars",
            ),
            (
                "http://127.0.0.1:5000/base/",
                vec!["view", "AB12CD"],
                "http://127.0.0.1:5000/base/view/AB12CD",
            ),
            ("https://sendinginfo.in", vec!["create_paste"], "https://sendinginfo.in/create_paste"),
        ];
        for (base, segments, expected) in cases {
            let endpoints = Endpoints::new(base).expect("endpoints should build");
            assert_eq!(endpoints.join(&segments).as_str(), expected);
        }
    }

    #[test]
    fn endpoints_reject_non_base_urls() {
        assert!(Endpoints::new("mailto:someone@example.com").is_err());
        assert!(Endpoints::new("no scheme").is_err());
        assert!(ShareClient::new("no scheme", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn server_message_matrix_covers_json_plain_text_and_html() {
        let cases = [
            (r#"{"error":"expired"}"#, Some("expired")),
            ("   ", None),
            (r#"{"detail":"nope"}"#, None),
            (r#"{"error":null}"#, None),
            (
                "File too large. Try compressing before upload.",
                Some("File too large. Try compressing before upload."),
            ),
            ("<html><body>gone</body></html>", None),
        ];
        for (body, expected) in cases {
            assert_eq!(server_message(body).as_deref(), expected, "body: {}", body);
        }
    }

    #[test]
    fn remote_error_display_falls_back_to_reason_phrase() {
        let with_message = ClientError::Remote {
            status: 429,
            message: Some("Too many requests. Please slow down.".to_string()),
        };
        let without_message = ClientError::Remote {
            status: 404,
            message: None,
        };
        assert_eq!(with_message.to_string(), "Too many requests. Please slow down.");
        assert_eq!(without_message.to_string(), "Not Found");
    }

    #[test]
    fn interpret_json_treats_error_field_on_ok_status_as_remote_error() {
        let result: Result<UploadReceipt, _> =
            interpret_json(StatusCode::OK, r#"{"error":"Please accept the Terms first!"}"#);
        match result {
            Err(ClientError::Remote { status, message }) => {
                assert_eq!(status, 200);
                assert_eq!(message.as_deref(), Some("Please accept the Terms first!"));
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn interpret_json_without_error_on_failure_status_leaves_message_empty() {
        let result: Result<PasteCreated, _> =
            interpret_json(StatusCode::INTERNAL_SERVER_ERROR, "");
        match result {
            Err(ClientError::Remote { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.is_none());
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn interpret_json_reports_shape_mismatch_as_decode_error() {
        let result: Result<PasteCreated, _> =
            interpret_json(StatusCode::OK, r#"{"message":"ok","code":"AB12CD"}"#);
        assert!(matches!(result, Err(ClientError::Decode(_))));

        let result: Result<PasteCreated, _> = interpret_json(StatusCode::OK, "not json");
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[test]
    fn interpret_json_decodes_success_body() {
        let created: PasteCreated = interpret_json(
            StatusCode::OK,
            r#"{"message":"Paste created successfully!","code":"AB12CD","max_views":3}"#,
        )
        .expect("decode paste");
        assert_eq!(created.code, "AB12CD");
        assert_eq!(created.max_views, 3);
    }

    #[test]
    fn client_urls_are_keyed_by_code() {
        let client = ShareClient::new("http://localhost:5000/", Duration::from_secs(5))
            .expect("client");
        let endpoints = client.endpoints();
        assert_eq!(endpoints.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            endpoints.view_url("AB12CD").as_str(),
            "http://127.0.0.1:5000/view/AB12CD"
        );
        assert_eq!(
            endpoints.raw_url("AB12CD").as_str(),
            "http://127.0.0.1:5000/raw/AB12CD"
        );
        assert_eq!(
            endpoints.download_url("482913").as_str(),
            "http://127.0.0.1:5000/download/482913"
        );
    }
}
