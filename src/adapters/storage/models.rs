//! Presigned storage wire models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Presigned URL for a single PUT or GET
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedUrlResponse {
    pub url: String,
    /// Object key the URL is bound to
    pub key: String,
}

/// Presigned form POST
///
/// `fields` must be sent as form fields before the file part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedPostResponse {
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    pub key: String,
}

/// One object in the bucket listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Limits enforced by the signing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConstraints {
    pub max_file_size: u64,
    #[serde(default)]
    pub allowed_content_types: Vec<String>,
}
