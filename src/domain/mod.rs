//! Domain models and types for exportwatch.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`JobId`], [`RequestId`])
//! - **Export job model** ([`ExportJob`], [`ExportStatus`], [`JobMetrics`])
//! - **Error types** ([`AppError`], [`ApiError`], [`PollerError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Status transitions
//!
//! [`ExportStatus`] is a tagged enum so terminal checks are exhaustive:
//!
//! ```rust
//! use exportwatch::domain::ExportStatus;
//!
//! assert!(ExportStatus::Pending.can_transition_to(ExportStatus::Running));
//! assert!(!ExportStatus::Completed.can_transition_to(ExportStatus::Running));
//! assert!(ExportStatus::Failed.is_terminal());
//! ```

pub mod errors;
pub mod ids;
pub mod job;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ApiError, ApiErrorKind, AppError, PollerError, StorageError, UNKNOWN_REQUEST_ID};
pub use ids::{JobId, RequestId};
pub use job::{ExportJob, ExportStatus, JobMetrics};
pub use result::Result;
