//! Backend actuator metrics adapter

pub mod client;
pub mod models;

pub use client::MetricsClient;
pub use models::{HealthStatus, MetricValue, SystemMetrics};
