// exportwatch - Export job and presigned storage client
// Copyright (c) 2025 exportwatch Contributors
// Licensed under the MIT License

//! # exportwatch - Export job and presigned storage client
//!
//! exportwatch drives a backend that runs long export jobs and signs object
//! storage URLs. All heavy lifting happens on the backend; this crate issues
//! the HTTP calls, tracks job state and renders it.
//!
//! ## Overview
//!
//! This library provides:
//! - **Polling** an export job from creation to `COMPLETED` or `FAILED`
//! - **Downloading** results through fresh presigned URLs
//! - **Uploading** files through presigned PUT or form POST
//! - **Reading** process metrics and health from the backend actuator
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Poller, uploads and formatting
//! - [`adapters`] - HTTP clients for the backend endpoint families
//! - [`domain`] - Job model, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exportwatch::adapters::exports::HttpExportApi;
//! use exportwatch::config::load_config_or_default;
//! use exportwatch::core::poller::ExportPoller;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("exportwatch.toml")?;
//!     let api = HttpExportApi::new(config.backend.clone())?;
//!     let poller = ExportPoller::from_config(api, &config.poller);
//!
//!     let job_id = poller.start().await?;
//!     let snapshot = poller.wait_until_idle().await;
//!
//!     if snapshot.job.as_ref().is_some_and(|job| job.is_completed()) {
//!         println!("{}", poller.get_download_url(&job_id).await?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Observing progress
//!
//! Every applied poll is published on a watch channel:
//!
//! ```rust,no_run
//! # use exportwatch::adapters::exports::HttpExportApi;
//! # use exportwatch::core::poller::ExportPoller;
//! # async fn example(poller: ExportPoller<HttpExportApi>) {
//! let mut rx = poller.subscribe();
//! while rx.changed().await.is_ok() {
//!     let snapshot = rx.borrow_and_update().clone();
//!     if let Some(job) = &snapshot.job {
//!         println!("{} {}%", job.status, job.progress_percent_or_computed());
//!     }
//!     if !snapshot.in_progress {
//!         break;
//!     }
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Backend failures are normalized into [`domain::ApiError`], which always
//! carries a correlation id:
//!
//! ```rust
//! use exportwatch::domain::{ApiError, ApiErrorKind};
//!
//! let err = ApiError::new(ApiErrorKind::Status, 503, "Service Unavailable", "req-42");
//! assert_eq!(err.to_user_message(), "Service Unavailable (support code: req-42)");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
