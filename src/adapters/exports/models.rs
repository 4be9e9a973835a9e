//! Export API wire models

use crate::domain::JobId;
use serde::{Deserialize, Serialize};

/// Response to `POST /exports/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExportResponse {
    /// Id of the newly created job
    pub job_id: JobId,

    #[serde(default)]
    pub message: String,

    /// Relative URL of the status endpoint
    #[serde(default)]
    pub status_url: String,
}

/// Response to `GET /exports/{jobId}/download-url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponse {
    /// Presigned, time-limited URL of the export file
    pub download_url: String,
}
