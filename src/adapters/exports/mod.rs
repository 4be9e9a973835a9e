//! Export API adapter
//!
//! The [`ExportApi`] trait describes the three export endpoints of the
//! backend; [`HttpExportApi`] implements it over HTTP.

pub mod api;
pub mod client;
pub mod models;

pub use api::ExportApi;
pub use client::HttpExportApi;
pub use models::{DownloadUrlResponse, StartExportResponse};
