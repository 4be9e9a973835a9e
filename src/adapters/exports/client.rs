//! HTTP implementation of the export API

use super::api::ExportApi;
use super::models::{DownloadUrlResponse, StartExportResponse};
use crate::adapters::http::BackendHttp;
use crate::config::BackendConfig;
use crate::domain::{ApiError, ExportJob, JobId, Result};
use async_trait::async_trait;

/// Export API client over reqwest
///
/// Endpoints live under `backend.exports_path` (`/exports` by default).
#[derive(Debug, Clone)]
pub struct HttpExportApi {
    http: BackendHttp,
}

impl HttpExportApi {
    /// Create a new client from backend configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self {
            http: BackendHttp::new(config)?,
        })
    }

    /// Wrap an existing backend HTTP client
    pub fn from_http(http: BackendHttp) -> Self {
        Self { http }
    }

    fn url(&self, path: &str) -> String {
        self.http.url(&self.http.config().exports_path, path)
    }

    fn job_url(&self, segments: &[&str]) -> std::result::Result<String, ApiError> {
        self.http
            .segment_url(&self.http.config().exports_path, segments)
    }

    /// Base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.http.config().base_url
    }
}

#[async_trait]
impl ExportApi for HttpExportApi {
    async fn start_export(&self) -> std::result::Result<StartExportResponse, ApiError> {
        let url = self.url("users");
        tracing::debug!(url = %url, "Requesting export job creation");

        let response: StartExportResponse = self.http.send_json(self.http.post(&url)).await?;

        tracing::info!(
            job_id = %response.job_id,
            message = %response.message,
            "Export job created"
        );
        Ok(response)
    }

    async fn get_status(&self, job_id: &JobId) -> std::result::Result<ExportJob, ApiError> {
        let url = self.job_url(&[job_id.as_str()])?;
        self.http.send_json(self.http.get(&url)).await
    }

    async fn get_download_url(
        &self,
        job_id: &JobId,
    ) -> std::result::Result<DownloadUrlResponse, ApiError> {
        let url = self.job_url(&[job_id.as_str(), "download-url"])?;
        tracing::debug!(job_id = %job_id, "Requesting download URL");
        self.http.send_json(self.http.get(&url)).await
    }
}
