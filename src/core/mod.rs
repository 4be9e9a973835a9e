//! Core client logic for exportwatch.
//!
//! # Modules
//!
//! - [`poller`] - Export job lifecycle: start, interval polling, teardown
//! - [`upload`] - Local validation and presigned uploads
//! - [`format`] - Human-readable sizes, durations and rates
//!
//! # Export Workflow
//!
//! 1. **Start**: `POST /exports/users` creates the job
//! 2. **Seed**: one immediate status fetch
//! 3. **Poll**: fixed-interval status fetches, one in flight at a time
//! 4. **Finish**: the session is torn down on `COMPLETED` or `FAILED`
//! 5. **Download**: a fresh presigned URL is requested on demand
//!
//! # Example
//!
//! ```rust,no_run
//! use exportwatch::adapters::exports::HttpExportApi;
//! use exportwatch::config::load_config;
//! use exportwatch::core::poller::ExportPoller;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("exportwatch.toml")?;
//! let api = HttpExportApi::new(config.backend.clone())?;
//! let poller = ExportPoller::from_config(api, &config.poller);
//!
//! poller.start().await?;
//! let snapshot = poller.wait_until_idle().await;
//! println!("{:?}", snapshot.job.map(|job| job.status));
//! # Ok(())
//! # }
//! ```

pub mod format;
pub mod poller;
pub mod upload;
