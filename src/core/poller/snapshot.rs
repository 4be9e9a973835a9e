//! Observable poller state

use crate::domain::{ExportJob, JobId, PollerError};

/// What the presentation layer sees after every applied poll
#[derive(Debug, Clone, Default)]
pub struct PollerSnapshot {
    /// Last observed job document
    pub job: Option<ExportJob>,

    /// Most recent failure; cleared by the next successful fetch
    pub error: Option<PollerError>,

    /// True while a start is in flight or a session is polling
    pub in_progress: bool,
}

impl PollerSnapshot {
    pub fn job_id(&self) -> Option<&JobId> {
        self.job.as_ref().map(|job| &job.id)
    }

    /// Polling has ended and the last job reached a terminal status
    pub fn is_finished(&self) -> bool {
        !self.in_progress && self.job.as_ref().is_some_and(ExportJob::is_terminal)
    }

    /// User-facing text for the current error, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(PollerError::to_user_message)
    }
}
