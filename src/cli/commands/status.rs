//! Status and download-url command implementations

use super::{exit_code, load_command_config, poller_exit_code};
use crate::adapters::exports::HttpExportApi;
use crate::cli::render::job_summary_lines;
use crate::core::poller::ExportPoller;
use crate::domain::{JobId, PollerError};
use chrono::Utc;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Export job id
    pub job_id: JobId,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(job_id = %self.job_id, "Fetching export status");

        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let poller = ExportPoller::from_config(HttpExportApi::new(config.backend)?, &config.poller);

        match poller.poll(&self.job_id).await {
            Ok(job) => {
                println!("📋 Export Job");
                for line in job_summary_lines(&job, Utc::now()) {
                    println!("{line}");
                }
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                Ok(poller_exit_code(&e))
            }
        }
    }
}

/// Arguments for the download-url command
#[derive(Args, Debug)]
pub struct DownloadUrlArgs {
    /// Export job id
    pub job_id: JobId,
}

impl DownloadUrlArgs {
    /// Execute the download-url command
    ///
    /// The job is fetched first; a URL is only requested once it is completed.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let poller = ExportPoller::from_config(HttpExportApi::new(config.backend)?, &config.poller);

        let job = match poller.poll(&self.job_id).await {
            Ok(job) => job,
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                return Ok(poller_exit_code(&e));
            }
        };

        match poller.get_download_url(&self.job_id).await {
            Ok(url) => {
                println!("{url}");
                Ok(exit_code::SUCCESS)
            }
            Err(PollerError::JobNotCompleted { job_id }) => {
                eprintln!("❌ Export {job_id} is {}, not COMPLETED", job.status);
                Ok(exit_code::JOB_FAILED)
            }
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                Ok(poller_exit_code(&e))
            }
        }
    }
}
