//! Metrics and health command implementations

use super::{api_exit_code, exit_code, load_command_config};
use crate::adapters::metrics::{MetricsClient, SystemMetrics};
use crate::core::format::format_uptime;
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

/// Arguments for the metrics command
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Keep refreshing until interrupted
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval in milliseconds when watching
    #[arg(long, default_value_t = 2000)]
    pub interval_ms: u64,
}

impl MetricsArgs {
    /// Execute the metrics command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let client = MetricsClient::new(config.backend)?;

        if !self.watch {
            print_metrics(&client.system_metrics().await);
            return Ok(exit_code::SUCCESS);
        }

        let mut ticker = time::interval(Duration::from_millis(self.interval_ms.max(100)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_signal.changed() => break,
            }

            // A slow actuator must not delay shutdown
            let metrics = tokio::select! {
                metrics = client.system_metrics() => metrics,
                _ = shutdown_signal.changed() => break,
            };
            print_metrics(&metrics);
            println!();
        }

        tracing::info!("Metrics watch stopped");
        Ok(exit_code::SUCCESS)
    }
}

/// Percentage of `value` in `max`, 0 when the maximum is unknown
fn usage_percent(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max * 100.0
    } else {
        0.0
    }
}

fn metrics_lines(metrics: &SystemMetrics) -> Vec<String> {
    vec![
        format!(
            "  Heap: {:.1} / {:.0} MB ({:.1}%)",
            metrics.heap_used,
            metrics.heap_max,
            usage_percent(metrics.heap_used, metrics.heap_max)
        ),
        format!("  Heap committed: {:.1} MB", metrics.heap_committed),
        format!("  Non-heap: {:.1} MB", metrics.non_heap_used),
        format!("  Process CPU: {:.1}%", metrics.cpu_usage),
        format!("  System CPU: {:.1}%", metrics.cpu_system),
        format!(
            "  Threads: {:.0} live / {:.0} peak",
            metrics.threads_live, metrics.threads_peak
        ),
        format!("  Uptime: {}", format_uptime(metrics.uptime)),
    ]
}

fn print_metrics(metrics: &SystemMetrics) {
    println!("📈 System Metrics ({})", chrono::Local::now().format("%H:%M:%S"));
    for line in metrics_lines(metrics) {
        println!("{line}");
    }
}

/// Arguments for the health command
#[derive(Args, Debug)]
pub struct HealthArgs {}

impl HealthArgs {
    /// Execute the health command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_command_config(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let client = MetricsClient::new(config.backend)?;

        match client.health().await {
            Ok(health) if health.is_up() => {
                println!("✅ Backend is {}", health.status);
                Ok(exit_code::SUCCESS)
            }
            Ok(health) => {
                println!("⚠️  Backend is {}", health.status);
                Ok(exit_code::JOB_FAILED)
            }
            Err(e) => {
                eprintln!("❌ {}", e.to_user_message());
                Ok(api_exit_code(&e))
            }
        }
    }
}
