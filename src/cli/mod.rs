//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for exportwatch using clap.

pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};

/// exportwatch - export job and presigned storage client
#[derive(Parser, Debug)]
#[command(name = "exportwatch")]
#[command(version, about, long_about = None)]
#[command(author = "exportwatch Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "exportwatch.toml",
        env = "EXPORTWATCH_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EXPORTWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a user export and follow it until it finishes
    Export(commands::export::ExportArgs),

    /// Show the status of an export job
    Status(commands::status::StatusArgs),

    /// Print a fresh download URL for a completed export
    DownloadUrl(commands::status::DownloadUrlArgs),

    /// Upload a file through a presigned URL
    Upload(commands::storage::UploadArgs),

    /// List uploaded files
    Files(commands::storage::FilesArgs),

    /// Print a presigned download URL for an object key
    PresignGet(commands::storage::PresignGetArgs),

    /// Show the upload limits enforced by the backend
    UploadConstraints(commands::storage::UploadConstraintsArgs),

    /// Show backend process metrics
    Metrics(commands::metrics::MetricsArgs),

    /// Check backend health
    Health(commands::metrics::HealthArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
