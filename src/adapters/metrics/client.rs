//! Actuator metrics client

use super::models::{HealthStatus, MetricValue, SystemMetrics};
use crate::adapters::http::BackendHttp;
use crate::config::BackendConfig;
use crate::domain::{ApiError, Result};
use futures::future::join_all;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Dashboard metrics, in `SystemMetrics` field order
///
/// `jvm.memory.used` also fills the non-heap slot.
const SYSTEM_METRICS: [&str; 9] = [
    "jvm.memory.used",
    "jvm.memory.max",
    "jvm.memory.committed",
    "jvm.memory.used",
    "process.cpu.usage",
    "system.cpu.usage",
    "jvm.threads.live",
    "jvm.threads.peak",
    "process.uptime",
];

/// Reads process metrics from the backend actuator
#[derive(Debug, Clone)]
pub struct MetricsClient {
    http: BackendHttp,
}

impl MetricsClient {
    /// Create a new metrics client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self {
            http: BackendHttp::new(config)?,
        })
    }

    fn url(&self, path: &str) -> String {
        self.http.url(&self.http.config().actuator_path, path)
    }

    /// First measurement of a metric
    ///
    /// A missing or unreadable metric reads as 0.
    pub async fn get_metric(&self, name: &str) -> f64 {
        let url = self.url(&format!("metrics/{name}"));
        match self.http.send_json::<MetricValue>(self.http.get(&url)).await {
            Ok(metric) => metric.first_value(),
            Err(e) => {
                tracing::debug!(metric = name, error = %e, "Metric unavailable");
                0.0
            }
        }
    }

    /// Fetches all dashboard metrics concurrently
    pub async fn system_metrics(&self) -> SystemMetrics {
        let values = join_all(SYSTEM_METRICS.map(|name| self.get_metric(name))).await;
        let [
            heap_used,
            heap_max,
            heap_committed,
            non_heap_used,
            cpu_usage,
            cpu_system,
            threads_live,
            threads_peak,
            uptime,
        ] = values[..]
        else {
            return SystemMetrics::default();
        };

        SystemMetrics {
            heap_used: heap_used / BYTES_PER_MIB,
            heap_max: heap_max / BYTES_PER_MIB,
            heap_committed: heap_committed / BYTES_PER_MIB,
            non_heap_used: non_heap_used / BYTES_PER_MIB,
            cpu_usage: cpu_usage * 100.0,
            cpu_system: cpu_system * 100.0,
            threads_live,
            threads_peak,
            uptime,
        }
    }

    /// Backend health
    pub async fn health(&self) -> std::result::Result<HealthStatus, ApiError> {
        self.http.send_json(self.http.get(&self.url("health"))).await
    }
}
