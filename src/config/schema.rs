//! Configuration schema types
//!
//! This module defines the configuration structure for exportwatch. Every
//! section has a `Default` so the tool runs against a local backend without
//! a configuration file.

use serde::{Deserialize, Serialize};
use url::Url;

/// Main exportwatch configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportWatchConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Export poller settings
    #[serde(default)]
    pub poller: PollerConfig,

    /// Client-side upload constraints
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExportWatchConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.backend.validate()?;
        self.poller.validate()?;
        self.upload.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the export endpoints
    #[serde(default = "default_exports_path")]
    pub exports_path: String,

    /// Path prefix of the presigned storage endpoints
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Path prefix of the metrics endpoints
    #[serde(default = "default_actuator_path")]
    pub actuator_path: String,

    /// Header carrying the correlation id
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,

    /// Per-request timeout in seconds; unset uses the transport default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// TLS certificate verification enabled
    ///
    /// Disabling this should only be done against local development backends.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl BackendConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("backend.base_url cannot be empty".to_string());
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("backend.base_url is not a valid URL: {e}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("backend.base_url must start with http:// or https://".to_string());
        }

        for (name, path) in [
            ("exports_path", &self.exports_path),
            ("storage_path", &self.storage_path),
            ("actuator_path", &self.actuator_path),
        ] {
            if !path.starts_with('/') {
                return Err(format!("backend.{name} must start with '/'"));
            }
        }

        if self.request_id_header.trim().is_empty() {
            return Err("backend.request_id_header cannot be empty".to_string());
        }

        if let Some(timeout) = self.timeout_seconds {
            if timeout == 0 {
                return Err("backend.timeout_seconds must be greater than 0".to_string());
            }
        }

        Ok(())
    }

    /// Joins the base URL with a path, avoiding duplicate slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            exports_path: default_exports_path(),
            storage_path: default_storage_path(),
            actuator_path: default_actuator_path(),
            request_id_header: default_request_id_header(),
            timeout_seconds: None,
            tls_verify: true,
        }
    }
}

/// Export poller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between status fetches in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

impl PollerConfig {
    fn validate(&self) -> Result<(), String> {
        if !(100..=60_000).contains(&self.interval_ms) {
            return Err(format!(
                "poller.interval_ms must be between 100 and 60000, got {}",
                self.interval_ms
            ));
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Client-side upload constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted file in bytes
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Accepted MIME types
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
}

impl UploadConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_file_size_bytes == 0 {
            return Err("upload.max_file_size_bytes must be greater than 0".to_string());
        }
        if self.allowed_content_types.is_empty() {
            return Err("upload.allowed_content_types cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled is true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_exports_path() -> String {
    "/exports".to_string()
}

fn default_storage_path() -> String {
    "/api/s3".to_string()
}

fn default_actuator_path() -> String {
    "/actuator".to_string()
}

fn default_request_id_header() -> String {
    "X-Request-ID".to_string()
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_file_size_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_content_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "application/pdf",
        "application/zip",
        "application/x-zip-compressed",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
