//! Export command implementation
//!
//! This module implements the `export` command: it starts a user export,
//! follows the poller until the job finishes, and prints the result.

use super::{exit_code, load_command_config, poller_exit_code};
use crate::adapters::exports::HttpExportApi;
use crate::cli::render::{job_summary_lines, progress_line};
use crate::core::poller::{ExportPoller, PollerSnapshot};
use crate::domain::{ExportStatus, JobId};
use chrono::Utc;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Print a fresh download URL when the export completes
    #[arg(long)]
    pub download: bool,

    /// Override the status polling interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };

        if let Some(interval_ms) = self.interval_ms {
            tracing::info!(interval_ms, "Overriding poll interval from CLI");
            config.poller.interval_ms = interval_ms;
            if let Err(e) = config.validate() {
                eprintln!("❌ Configuration validation failed: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        }

        let api = HttpExportApi::new(config.backend.clone())?;
        let poller = ExportPoller::from_config(api, &config.poller);

        println!("🚀 Starting export against {}", config.backend.base_url);

        let started = tokio::select! {
            started = poller.start() => started,
            _ = shutdown_signal.changed() => {
                poller.stop();
                println!("⚠️  Export start interrupted");
                tracing::info!("Export start interrupted by user signal");
                return Ok(exit_code::INTERRUPTED);
            }
        };
        let job_id = match started {
            Ok(job_id) => job_id,
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                return Ok(poller_exit_code(&e));
            }
        };
        println!("   Job ID: {job_id}");
        println!();

        let mut rx = poller.subscribe();
        let mut last_line = String::new();

        let interrupted = loop {
            let snapshot = rx.borrow_and_update().clone();
            print_progress(&snapshot, &mut last_line);
            if !snapshot.in_progress {
                break false;
            }

            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break false;
                    }
                }
                _ = shutdown_signal.changed() => {
                    poller.stop();
                    break true;
                }
            }
        };

        if interrupted {
            println!();
            println!("⚠️  Polling stopped. The export keeps running on the backend.");
            println!("   Check it later with: exportwatch status {job_id}");
            println!();
            tracing::info!(job_id = %job_id, "Export polling interrupted by user signal");
            return Ok(exit_code::INTERRUPTED);
        }

        self.finish(&poller, &job_id, poller.snapshot()).await
    }

    async fn finish(
        &self,
        poller: &ExportPoller<HttpExportApi>,
        job_id: &JobId,
        snapshot: PollerSnapshot,
    ) -> anyhow::Result<i32> {
        println!();

        let Some(job) = snapshot.job.as_ref().filter(|job| job.is_terminal()) else {
            let message = snapshot
                .error_message()
                .unwrap_or_else(|| "Polling ended before the export finished".to_string());
            eprintln!("❌ {message}");
            return Ok(snapshot
                .error
                .as_ref()
                .map(poller_exit_code)
                .unwrap_or(exit_code::FATAL));
        };

        println!("📊 Export Summary:");
        for line in job_summary_lines(job, Utc::now()) {
            println!("{line}");
        }
        println!();

        if job.status == ExportStatus::Failed {
            println!("❌ Export failed");
            return Ok(exit_code::JOB_FAILED);
        }

        println!("✅ Export completed successfully!");

        if self.download {
            match poller.get_download_url(job_id).await {
                Ok(url) => {
                    println!();
                    println!("⬇️  Download URL:");
                    println!("{url}");
                }
                Err(e) => {
                    eprintln!("❌ {}", e.to_user_message());
                    return Ok(poller_exit_code(&e));
                }
            }
        }

        Ok(exit_code::SUCCESS)
    }
}

/// Prints the progress line when it differs from the previous one
fn print_progress(snapshot: &PollerSnapshot, last_line: &mut String) {
    let mut line = match &snapshot.job {
        Some(job) => progress_line(job),
        None => "Waiting for first status...".to_string(),
    };
    if let Some(error) = snapshot.error_message() {
        line.push_str(&format!("  ⚠️  {error}"));
    }

    if *last_line != line {
        println!("{line}");
        *last_line = line;
    }
}
