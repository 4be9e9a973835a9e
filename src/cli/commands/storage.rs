//! Storage command implementations

use super::{api_exit_code, app_exit_code, exit_code, load_command_config, user_message};
use crate::adapters::storage::StorageClient;
use crate::core::format::format_file_size;
use crate::core::upload::{upload_file, UploadMethod};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the upload command
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// Object key (defaults to uploads/<millis>-<file name>)
    #[arg(long)]
    pub key: Option<String>,

    /// Upload method (put or post)
    #[arg(long, default_value = "put")]
    pub method: UploadMethod,
}

impl UploadArgs {
    /// Execute the upload command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let client = StorageClient::new(config.backend.clone())?;

        println!(
            "📤 Uploading {} with {}",
            self.file.display(),
            self.method.to_string().to_uppercase()
        );

        match upload_file(
            &client,
            &config.upload,
            &self.file,
            self.key.clone(),
            self.method,
        )
        .await
        {
            Ok(outcome) => {
                println!("✅ Upload successful! Key: {}", outcome.key);
                println!(
                    "   {} ({})",
                    format_file_size(outcome.size),
                    outcome.content_type
                );
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                tracing::error!(file = %self.file.display(), error = %e, "Upload failed");
                eprintln!("❌ {}", user_message(&e));
                Ok(app_exit_code(&e))
            }
        }
    }
}

/// Arguments for the files command
#[derive(Args, Debug)]
pub struct FilesArgs {}

impl FilesArgs {
    /// Execute the files command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let client = StorageClient::new(config.backend)?;

        let files = match client.list_files().await {
            Ok(files) => files,
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                return Ok(api_exit_code(&e));
            }
        };

        if files.is_empty() {
            println!("No files uploaded yet");
            return Ok(exit_code::SUCCESS);
        }

        println!("{:<60} {:>12}  Last modified", "Key", "Size");
        for file in &files {
            println!(
                "{:<60} {:>12}  {}",
                file.key,
                format_file_size(file.size),
                file.last_modified.format("%Y-%m-%d %H:%M:%S")
            );
        }
        println!();
        println!("{} file(s)", files.len());
        Ok(exit_code::SUCCESS)
    }
}

/// Arguments for the presign-get command
#[derive(Args, Debug)]
pub struct PresignGetArgs {
    /// Object key
    pub key: String,
}

impl PresignGetArgs {
    /// Execute the presign-get command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let client = StorageClient::new(config.backend)?;

        match client.presigned_get_url(&self.key).await {
            Ok(presigned) => {
                println!("{}", presigned.url);
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ Download failed: {}", e.to_user_message());
                Ok(api_exit_code(&e))
            }
        }
    }
}

/// Arguments for the upload-constraints command
#[derive(Args, Debug)]
pub struct UploadConstraintsArgs {}

impl UploadConstraintsArgs {
    /// Execute the upload-constraints command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let client = StorageClient::new(config.backend)?;

        match client.upload_constraints().await {
            Ok(constraints) => {
                println!("Upload constraints:");
                println!(
                    "  Max file size: {}",
                    format_file_size(constraints.max_file_size)
                );
                println!("  Allowed content types:");
                for content_type in &constraints.allowed_content_types {
                    println!("    - {content_type}");
                }
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                Ok(api_exit_code(&e))
            }
        }
    }
}
