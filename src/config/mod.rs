//! Configuration management for exportwatch.
//!
//! # Overview
//!
//! exportwatch uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `EXPORTWATCH_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use exportwatch::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("exportwatch.toml")?;
//! println!("Backend: {}", config.backend.base_url);
//! println!("Poll interval: {}ms", config.poller.interval_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [backend]
//! base_url = "${EXPORTWATCH_BASE_URL}"
//! exports_path = "/exports"
//!
//! [poller]
//! interval_ms = 1000
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, BackendConfig, ExportWatchConfig, LoggingConfig, PollerConfig, UploadConfig,
};
