//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an optional
//! rotating JSON file layer.
//!
//! # Example
//!
//! ```no_run
//! use exportwatch::logging::init_logging;
//! use exportwatch::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(job_id = "job-1", "Export started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a status fetch issued by the poller
///
/// # Example
///
/// ```no_run
/// use exportwatch::log_poll_tick;
///
/// log_poll_tick!("job-1", 3);
/// ```
#[macro_export]
macro_rules! log_poll_tick {
    ($job_id:expr, $tick:expr) => {
        tracing::debug!(job_id = %$job_id, tick = $tick, "Polling export status");
    };
}

/// Log an observed status change of an export job
///
/// # Example
///
/// ```no_run
/// use exportwatch::log_status_transition;
/// use exportwatch::domain::ExportStatus;
///
/// log_status_transition!("job-1", Some(ExportStatus::Pending), ExportStatus::Running);
/// ```
#[macro_export]
macro_rules! log_status_transition {
    ($job_id:expr, $from:expr, $to:expr) => {
        tracing::info!(
            job_id = %$job_id,
            from = ?$from,
            to = %$to,
            "Export status changed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use exportwatch::log_error_with_context;
/// use exportwatch::domain::AppError;
///
/// let error = AppError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
