//! File upload through presigned URLs
//!
//! Validation happens locally before the backend is asked to sign anything.

use crate::adapters::storage::StorageClient;
use crate::config::UploadConfig;
use crate::domain::{AppError, Result, StorageError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// How bytes reach the bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadMethod {
    /// Single presigned PUT
    #[default]
    Put,
    /// Presigned multipart form POST with policy fields
    Post,
}

impl fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMethod::Put => write!(f, "put"),
            UploadMethod::Post => write!(f, "post"),
        }
    }
}

impl FromStr for UploadMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "put" => Ok(UploadMethod::Put),
            "post" => Ok(UploadMethod::Post),
            other => Err(format!("Unknown upload method '{other}'. Use put or post")),
        }
    }
}

/// Result of a finished upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub method: UploadMethod,
}

/// Rejects files the signing service would refuse
///
/// # Errors
///
/// - `FileTooLarge` above `max_file_size_bytes`
/// - `ContentTypeNotAllowed` for types outside the allow-list
pub fn validate_upload(
    size: u64,
    content_type: &str,
    config: &UploadConfig,
) -> std::result::Result<(), StorageError> {
    if size > config.max_file_size_bytes {
        return Err(StorageError::FileTooLarge {
            size_mb: size as f64 / BYTES_PER_MB,
            max_mb: config.max_file_size_bytes as f64 / BYTES_PER_MB,
        });
    }

    if !config
        .allowed_content_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    {
        let shown = if content_type.is_empty() {
            "unknown"
        } else {
            content_type
        };
        return Err(StorageError::ContentTypeNotAllowed(shown.to_string()));
    }

    Ok(())
}

/// MIME type guessed from the file extension
///
/// Falls back to `application/octet-stream` for unknown extensions.
pub fn content_type_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// `uploads/{unix_millis}-{file_name}`
pub fn default_object_key(file_name: &str, now: DateTime<Utc>) -> String {
    format!("uploads/{}-{}", now.timestamp_millis(), file_name)
}

/// Validates, signs and uploads one local file
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or the
/// backend or storage rejects it.
pub async fn upload_file(
    client: &StorageClient,
    config: &UploadConfig,
    path: &Path,
    key: Option<String>,
    method: UploadMethod,
) -> Result<UploadOutcome> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::Other(format!("Not a file path: {}", path.display())))?
        .to_string();

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| AppError::Io(format!("Failed to read {}: {e}", path.display())))?
        .len();
    let content_type = content_type_for_path(path);
    let content_type = content_type.as_str();

    validate_upload(size, content_type, config)?;

    let key = key.unwrap_or_else(|| default_object_key(&file_name, Utc::now()));
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Io(format!("Failed to read {}: {e}", path.display())))?;

    tracing::info!(
        key = %key,
        size,
        content_type,
        method = %method,
        "Uploading file"
    );

    match method {
        UploadMethod::Put => {
            let presigned = client
                .presigned_put_url(&key, content_type, size)
                .await
                .map_err(StorageError::from)?;
            client
                .upload_with_put(&presigned.url, body, content_type)
                .await?;
        }
        UploadMethod::Post => {
            let presigned = client
                .presigned_post_url(&key, content_type)
                .await
                .map_err(StorageError::from)?;
            client
                .upload_with_post(&presigned, body, &file_name, content_type)
                .await?;
        }
    }

    tracing::info!(key = %key, "Upload complete");

    Ok(UploadOutcome {
        key,
        size,
        content_type: content_type.to_string(),
        method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test]
    fn test_validate_upload_accepts_allowed() {
        let config = UploadConfig::default();
        assert!(validate_upload(1024, "image/png", &config).is_ok());
        assert!(validate_upload(config.max_file_size_bytes, "application/pdf", &config).is_ok());
    }

    #[test]
    fn test_validate_upload_too_large() {
        let config = UploadConfig::default();
        let err = validate_upload(12 * 1024 * 1024 + 512 * 1024, "image/png", &config).unwrap_err();
        assert_eq!(err.to_string(), "File too large: 12.50MB. Max: 10MB");
    }

    #[test]
    fn test_validate_upload_content_type() {
        let config = UploadConfig::default();
        let err = validate_upload(10, "text/html", &config).unwrap_err();
        assert!(matches!(err, StorageError::ContentTypeNotAllowed(ref t) if t == "text/html"));

        let err = validate_upload(10, "", &config).unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }

    #[test_case("photo.JPG", "image/jpeg")]
    #[test_case("scan.pdf", "application/pdf")]
    #[test_case("archive.zip", "application/zip")]
    #[test_case("notes", "application/octet-stream")]
    #[test_case("binary.qqzz", "application/octet-stream")]
    #[test_case("page.html", "text/html")]
    fn test_content_type_for_path(name: &str, expected: &str) {
        assert_eq!(content_type_for_path(Path::new(name)), expected);
    }

    #[test]
    fn test_default_object_key() {
        let now = Utc.timestamp_millis_opt(1_736_496_000_123).unwrap();
        assert_eq!(
            default_object_key("report.pdf", now),
            "uploads/1736496000123-report.pdf"
        );
    }

    #[test]
    fn test_upload_method_parse() {
        assert_eq!("PUT".parse::<UploadMethod>().unwrap(), UploadMethod::Put);
        assert_eq!("post".parse::<UploadMethod>().unwrap(), UploadMethod::Post);
        assert!("patch".parse::<UploadMethod>().is_err());
    }
}
