//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "exportwatch.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing exportwatch configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set backend.base_url in {}", self.output);
                println!("  2. Validate configuration: exportwatch validate-config");
                println!("  3. Check the backend: exportwatch health");
                println!("  4. Run an export: exportwatch export --download");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }

    fn generate_config() -> String {
        r#"# exportwatch configuration file
#
# Values may reference environment variables as ${VAR_NAME}.
# Any key can also be overridden with EXPORTWATCH_<SECTION>_<KEY>.

[application]
# trace | debug | info | warn | error
log_level = "info"

[backend]
base_url = "http://localhost:8080"
exports_path = "/exports"
storage_path = "/api/s3"
actuator_path = "/actuator"

# Header carrying the correlation id shown as "support code"
request_id_header = "X-Request-ID"

# Per-request timeout; unset waits for the transport default
# timeout_seconds = 30

# Only disable against local development backends
tls_verify = true

[poller]
# Delay between status fetches (100..=60000)
interval_ms = 1000

[upload]
max_file_size_bytes = 10485760
allowed_content_types = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/zip",
    "application/x-zip-compressed",
]

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
