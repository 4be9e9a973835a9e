//! Export API trait definition
//!
//! This trait abstracts the backend's export endpoints so the poller can be
//! driven by the HTTP client in production and by scripted fakes in tests.

use super::models::{DownloadUrlResponse, StartExportResponse};
use crate::domain::{ApiError, ExportJob, JobId};
use async_trait::async_trait;

/// Backend operations consumed by the export poller
///
/// # Example
///
/// ```no_run
/// use exportwatch::adapters::exports::{ExportApi, HttpExportApi};
/// use exportwatch::config::BackendConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = HttpExportApi::new(BackendConfig::default())?;
/// let started = api.start_export().await?;
/// let job = api.get_status(&started.job_id).await?;
/// println!("{} is {}", job.id, job.status);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ExportApi: Send + Sync {
    /// Requests creation of a new user export job
    async fn start_export(&self) -> Result<StartExportResponse, ApiError>;

    /// Fetches the current status document of a job
    async fn get_status(&self, job_id: &JobId) -> Result<ExportJob, ApiError>;

    /// Requests a fresh presigned download URL for a completed job
    async fn get_download_url(&self, job_id: &JobId) -> Result<DownloadUrlResponse, ApiError>;
}
