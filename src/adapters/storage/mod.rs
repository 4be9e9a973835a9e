//! Presigned object storage adapter

pub mod client;
pub mod models;

pub use client::StorageClient;
pub use models::{PresignedPostResponse, PresignedUrlResponse, StoredFile, UploadConstraints};
