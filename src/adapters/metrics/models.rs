//! Actuator wire models

use serde::{Deserialize, Serialize};

/// One sample of a metric
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurement {
    pub statistic: String,
    pub value: f64,
}

/// Body of `GET {actuator}/metrics/{name}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_unit: Option<String>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl MetricValue {
    /// First measurement, or 0 when the metric has no samples
    pub fn first_value(&self) -> f64 {
        self.measurements.first().map(|m| m.value).unwrap_or(0.0)
    }
}

/// Backend process metrics
///
/// Memory figures are MiB, CPU figures are percent, uptime is seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub heap_used: f64,
    pub heap_max: f64,
    pub heap_committed: f64,
    pub non_heap_used: f64,
    pub cpu_usage: f64,
    pub cpu_system: f64,
    pub threads_live: f64,
    pub threads_peak: f64,
    pub uptime: f64,
}

/// Body of `GET {actuator}/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}
