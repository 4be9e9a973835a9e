//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the exportwatch configuration file.

use super::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing and applying overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Backend: {}", config.backend.base_url);
        println!("  Exports: {}", config.backend.endpoint(&config.backend.exports_path));
        println!("  Storage: {}", config.backend.endpoint(&config.backend.storage_path));
        println!("  Actuator: {}", config.backend.endpoint(&config.backend.actuator_path));
        println!(
            "  Request Timeout: {}",
            config
                .backend
                .timeout_seconds
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "none".to_string())
        );
        println!("  Poll Interval: {}ms", config.poller.interval_ms);
        println!(
            "  Max Upload Size: {} bytes",
            config.upload.max_file_size_bytes
        );
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                format!("{} ({})", config.logging.local_path, config.logging.local_rotation)
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(exit_code::SUCCESS)
    }
}
