//! CLI command implementations
//!
//! Every command returns its process exit code.

pub mod export;
pub mod init;
pub mod metrics;
pub mod status;
pub mod storage;
pub mod validate;

use crate::config::{load_config_or_default, ExportWatchConfig};
use crate::domain::{ApiError, ApiErrorKind, AppError, PollerError, StorageError};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// The export job failed or was not in the expected state
    pub const JOB_FAILED: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    /// The backend could not be reached
    pub const CONNECTION: i32 = 4;
    pub const FATAL: i32 = 5;
    /// SIGINT convention
    pub const INTERRUPTED: i32 = 130;
}

/// Loads configuration, reporting failures on stderr
pub(crate) fn load_command_config(config_path: &str) -> Result<ExportWatchConfig, i32> {
    load_config_or_default(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration: {e}");
        exit_code::CONFIGURATION
    })
}

pub(crate) fn api_exit_code(error: &ApiError) -> i32 {
    match error.kind {
        ApiErrorKind::Transport => exit_code::CONNECTION,
        ApiErrorKind::Status | ApiErrorKind::InvalidResponse => exit_code::FATAL,
    }
}

pub(crate) fn poller_exit_code(error: &PollerError) -> i32 {
    match error.api_error() {
        Some(api) => api_exit_code(api),
        None => exit_code::JOB_FAILED,
    }
}

pub(crate) fn app_exit_code(error: &AppError) -> i32 {
    match error {
        AppError::Configuration(_) => exit_code::CONFIGURATION,
        AppError::Api(api) => api_exit_code(api),
        AppError::Poller(e) => poller_exit_code(e),
        AppError::Storage(StorageError::Api(api)) => api_exit_code(api),
        AppError::Storage(StorageError::FileTooLarge { .. })
        | AppError::Storage(StorageError::ContentTypeNotAllowed(_)) => exit_code::CONFIGURATION,
        _ => exit_code::FATAL,
    }
}

/// Message shown for an error, with the support code when there is one
pub(crate) fn user_message(error: &AppError) -> String {
    match error {
        AppError::Api(api) | AppError::Storage(StorageError::Api(api)) => api.to_user_message(),
        AppError::Poller(e) => e.to_user_message(),
        other => other.to_string(),
    }
}
