//! Shared HTTP plumbing for backend clients
//!
//! Every outgoing request gets a fresh correlation id header. Non-2xx
//! responses and transport failures are normalized into [`ApiError`].

use crate::config::BackendConfig;
use crate::domain::{ApiError, ApiErrorKind, AppError, RequestId, Result, UNKNOWN_REQUEST_ID};
use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Error body returned by the backend
///
/// Export endpoints answer `{error}`; the global handler answers
/// `{status, message, requestId, timestamp}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// HTTP client bound to one backend
#[derive(Debug, Clone)]
pub struct BackendHttp {
    client: Client,
    config: BackendConfig,
}

impl BackendHttp {
    /// Builds the underlying reqwest client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialized.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new().connect_timeout(Duration::from_secs(30));

        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        if !config.tls_verify {
            tracing::warn!(
                base_url = %config.base_url,
                "TLS certificate verification disabled"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Raw client, for requests that must not carry backend headers
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Absolute URL for `prefix` + `path` on the backend
    pub fn url(&self, prefix: &str, path: &str) -> String {
        let prefix = self.config.endpoint(prefix);
        if path.is_empty() {
            return prefix;
        }
        format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Absolute URL for `prefix` followed by percent-encoded path segments
    ///
    /// # Errors
    ///
    /// Returns a transport error if the base URL cannot carry a path.
    pub fn segment_url(
        &self,
        prefix: &str,
        segments: &[&str],
    ) -> std::result::Result<String, ApiError> {
        let mut url = Url::parse(&self.config.endpoint(prefix))
            .map_err(|e| ApiError::transport(format!("Invalid backend URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::transport(format!(
                    "Backend URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Sends a request and decodes a JSON body
    ///
    /// # Errors
    ///
    /// - `Transport` when no response was received
    /// - `Status` for non-2xx responses
    /// - `InvalidResponse` when a 2xx body does not decode as `T`
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ApiError> {
        let request_id = RequestId::generate();
        let header = self.config.request_id_header.as_str();

        let response = request
            .header(header, request_id.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(request_id = %request_id, error = %e, "Backend request failed");
                ApiError::transport(e.to_string())
            })?;

        let status = response.status();
        let echoed_id = echoed_request_id(&response, header);

        if !status.is_success() {
            let error = error_from_response(response, echoed_id).await;
            tracing::warn!(
                request_id = %error.request_id,
                status = error.status,
                message = %error.message,
                "Backend returned an error"
            );
            return Err(error);
        }

        let bytes = response.bytes().await.map_err(|e| {
            ApiError::new(
                ApiErrorKind::Transport,
                status.as_u16(),
                e.to_string(),
                echoed_id
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string()),
            )
        })?;

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            ApiError::invalid_response(
                status.as_u16(),
                format!("Invalid response from backend: {e}"),
                echoed_id.unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string()),
            )
        })
    }
}

fn echoed_request_id(response: &Response, header: &str) -> Option<String> {
    response
        .headers()
        .get(header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Converts a non-2xx response into an [`ApiError`]
///
/// The correlation id comes from the response header, then the body, then
/// falls back to `"unknown"`.
async fn error_from_response(response: Response, echoed_id: Option<String>) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();

    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string());

    let request_id = echoed_id
        .or(parsed.request_id)
        .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string());

    let error = ApiError::new(ApiErrorKind::Status, status.as_u16(), message, request_id);
    match parsed.timestamp {
        Some(ts) => error.with_timestamp(ts),
        None => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend(url: &str) -> BackendHttp {
        BackendHttp::new(BackendConfig {
            base_url: url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_segment_url_encodes_reserved_characters() {
        let http = backend("http://localhost:8080/");
        assert_eq!(
            http.segment_url("/exports", &["a?x=1#frag", "download-url"])
                .unwrap(),
            "http://localhost:8080/exports/a%3Fx=1%23frag/download-url"
        );
        assert_eq!(
            http.segment_url("/exports/", &["job-1"]).unwrap(),
            "http://localhost:8080/exports/job-1"
        );
    }

    #[test]
    fn test_url_join() {
        let http = backend("http://localhost:8080/");
        assert_eq!(
            http.url("/exports", "users"),
            "http://localhost:8080/exports/users"
        );
        assert_eq!(http.url("/exports", ""), "http://localhost:8080/exports");
    }

    #[tokio::test]
    async fn test_send_json_attaches_request_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("X-Request-ID", mockito::Matcher::Regex("^[0-9a-f-]{36}$".into()))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let http = backend(&server.url());
        let value: serde_json::Value = http
            .send_json(http.get(&http.url("/ping", "")))
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_prefers_header_request_id() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fail")
            .with_status(500)
            .with_header("X-Request-ID", "srv-123")
            .with_body(
                r#"{"status":500,"message":"Internal server error","requestId":"body-456","timestamp":"2025-01-10T08:00:00Z"}"#,
            )
            .create_async()
            .await;

        let http = backend(&server.url());
        let err = http
            .send_json::<serde_json::Value>(http.get(&http.url("/fail", "")))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Status);
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "Internal server error");
        assert_eq!(err.request_id, "srv-123");
        assert_eq!(err.timestamp.to_rfc3339(), "2025-01-10T08:00:00+00:00");
    }

    #[tokio::test]
    async fn test_error_body_request_id_then_unknown() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/body")
            .with_status(400)
            .with_body(r#"{"message":"Bad request","requestId":"body-456"}"#)
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/bare")
            .with_status(400)
            .with_body(r#"{"error":"Export not completed yet"}"#)
            .create_async()
            .await;

        let http = backend(&server.url());
        let err = http
            .send_json::<serde_json::Value>(http.get(&http.url("/body", "")))
            .await
            .unwrap_err();
        assert_eq!(err.request_id, "body-456");

        let err = http
            .send_json::<serde_json::Value>(http.get(&http.url("/bare", "")))
            .await
            .unwrap_err();
        assert_eq!(err.request_id, UNKNOWN_REQUEST_ID);
        assert_eq!(err.message, "Export not completed yet");
    }

    #[tokio::test]
    async fn test_error_without_body_uses_reason_phrase() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let http = backend(&server.url());
        let err = http
            .send_json::<serde_json::Value>(http.get(&http.url("/missing", "")))
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Not Found");
    }

    #[tokio::test]
    async fn test_invalid_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let http = backend(&server.url());
        let err = http
            .send_json::<serde_json::Value>(http.get(&http.url("/garbage", "")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidResponse);
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on port 9 of localhost
        let http = backend("http://127.0.0.1:9");
        let err = http
            .send_json::<serde_json::Value>(http.get(&http.url("/x", "")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.request_id, UNKNOWN_REQUEST_ID);
    }
}
