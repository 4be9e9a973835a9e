//! Domain error types
//!
//! This module defines the error hierarchy for exportwatch. Every backend
//! failure is normalized into [`ApiError`] so the presentation layer can show
//! one uniform message that always carries the correlation id.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Correlation id used when the backend did not echo one
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Main application error type
///
/// This is the primary error type used by the CLI and the configuration
/// layer. Component errors convert into it with `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend API errors outside of a poller operation
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Export poller errors
    #[error("Export error: {0}")]
    Poller(#[from] PollerError),

    /// Presigned storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Category of a backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a response (DNS, connect, reset)
    Transport,
    /// The backend answered with a non-2xx status
    Status,
    /// The backend answered 2xx but the body could not be understood
    InvalidResponse,
}

/// Uniform backend failure
///
/// Carries the HTTP status, a human message, the correlation id and the time
/// the failure was observed (or the time reported by the backend).
#[derive(Debug, Clone, Error)]
#[error("{message} (status {status}, request id {request_id})")]
pub struct ApiError {
    /// Failure category
    pub kind: ApiErrorKind,

    /// HTTP status; 500 when no response was received
    pub status: u16,

    /// Human readable message
    pub message: String,

    /// Correlation id echoed by the backend, or `"unknown"`
    pub request_id: String,

    /// When the failure happened
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    /// Creates a new API error stamped with the current time
    pub fn new(
        kind: ApiErrorKind,
        status: u16,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            request_id: request_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// A failure where no response was received
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, 500, message, UNKNOWN_REQUEST_ID)
    }

    /// A 2xx response whose body was not understood
    pub fn invalid_response(
        status: u16,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(ApiErrorKind::InvalidResponse, status, message, request_id)
    }

    /// Overrides the timestamp with the one reported by the backend
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Message shown to the end user, always including the support code
    pub fn to_user_message(&self) -> String {
        format!("{} (support code: {})", self.message, self.request_id)
    }

    /// Whether retrying the same request can succeed
    pub fn is_recoverable(&self) -> bool {
        self.kind != ApiErrorKind::InvalidResponse
    }
}

/// Export poller errors
#[derive(Debug, Clone, Error)]
pub enum PollerError {
    /// Job creation was rejected or the backend was unreachable
    #[error("Failed to start export: {0}")]
    StartFailed(ApiError),

    /// A single status fetch failed
    #[error("Failed to fetch export status: {0}")]
    PollFailed(ApiError),

    /// The download URL could not be obtained
    #[error("Failed to get download URL: {0}")]
    DownloadUrlFailed(ApiError),

    /// `start` was called while a session is starting or polling
    ///
    /// `job_id` is `None` while job creation is still in flight.
    #[error("An export is already in progress{}", job_suffix(.job_id))]
    SessionAlreadyActive { job_id: Option<String> },

    /// A download URL was requested before the job was observed as completed
    #[error("Export job {job_id} has not completed")]
    JobNotCompleted { job_id: String },
}

impl PollerError {
    /// The backend failure behind this error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            PollerError::StartFailed(e)
            | PollerError::PollFailed(e)
            | PollerError::DownloadUrlFailed(e) => Some(e),
            PollerError::SessionAlreadyActive { .. } | PollerError::JobNotCompleted { .. } => None,
        }
    }

    /// Message shown to the end user
    pub fn to_user_message(&self) -> String {
        match self.api_error() {
            Some(e) => e.to_user_message(),
            None => self.to_string(),
        }
    }
}

fn job_suffix(job_id: &Option<String>) -> String {
    job_id
        .as_deref()
        .map(|id| format!(" (job {id})"))
        .unwrap_or_default()
}

/// Presigned storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// File exceeds the configured upload limit
    #[error("File too large: {size_mb:.2}MB. Max: {max_mb:.0}MB")]
    FileTooLarge { size_mb: f64, max_mb: f64 },

    /// Content type is not in the allow-list
    #[error("File type not allowed: {0}. Allowed: images, PDF, ZIP")]
    ContentTypeNotAllowed(String),

    /// Direct upload to the presigned URL failed
    #[error("Upload failed with status {status}")]
    UploadFailed { status: u16 },

    /// The signing backend failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

// Conversion from std::io::Error
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_api_error_user_message_includes_request_id() {
        let err = ApiError::new(ApiErrorKind::Status, 404, "Job not found", "req-42");
        assert_eq!(err.to_user_message(), "Job not found (support code: req-42)");
    }

    #[test]
    fn test_transport_error_defaults() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.status, 500);
        assert_eq!(err.request_id, UNKNOWN_REQUEST_ID);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invalid_response_is_not_recoverable() {
        let err = ApiError::invalid_response(200, "unrecognized status", "req-1");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_poller_error_user_message() {
        let api = ApiError::new(ApiErrorKind::Status, 503, "Unavailable", "abc");
        let err = PollerError::PollFailed(api);
        assert_eq!(err.to_user_message(), "Unavailable (support code: abc)");

        let err = PollerError::SessionAlreadyActive {
            job_id: Some("job-1".to_string()),
        };
        assert!(err.api_error().is_none());
        assert!(err.to_user_message().contains("job-1"));

        let err = PollerError::SessionAlreadyActive { job_id: None };
        assert_eq!(err.to_string(), "An export is already in progress");
    }

    #[test]
    fn test_poller_error_conversion() {
        let err = PollerError::JobNotCompleted {
            job_id: "job-1".to_string(),
        };
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Poller(_)));
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::FileTooLarge {
            size_mb: 12.5,
            max_mb: 10.0,
        };
        assert_eq!(err.to_string(), "File too large: 12.50MB. Max: 10MB");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let app_err: AppError = toml_err.into();
        assert!(matches!(app_err, AppError::Configuration(_)));
        assert!(app_err.to_string().contains("TOML parse error"));
    }
}
