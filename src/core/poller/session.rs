//! Poll session bookkeeping

use crate::domain::{ExportJob, JobId};
use tokio::sync::watch;

/// One active polling loop
///
/// Dropping the session drops the cancel sender, which also ends the loop.
#[derive(Debug)]
pub(crate) struct PollSession {
    job_id: JobId,
    generation: u64,
    cancel: watch::Sender<bool>,
}

impl PollSession {
    pub(crate) fn new(job_id: JobId, generation: u64) -> (Self, watch::Receiver<bool>) {
        let (cancel, cancel_rx) = watch::channel(false);
        (
            Self {
                job_id,
                generation,
                cancel,
            },
            cancel_rx,
        )
    }

    pub(crate) fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub(crate) fn cancel(&self) {
        let _ = self.cancel.send(true);
    }
}

/// Occupancy of the single session slot
#[derive(Debug, Default)]
pub(crate) enum SessionSlot {
    #[default]
    Idle,
    /// Job creation or the seed fetch is in flight
    Starting { generation: u64 },
    Active(PollSession),
}

impl SessionSlot {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, SessionSlot::Idle)
    }

    /// True if the slot still belongs to the start or loop with `generation`
    pub(crate) fn is_generation(&self, generation: u64) -> bool {
        match self {
            SessionSlot::Idle => false,
            SessionSlot::Starting { generation: g } => *g == generation,
            SessionSlot::Active(session) => session.generation == generation,
        }
    }

    pub(crate) fn job_id(&self) -> Option<&JobId> {
        match self {
            SessionSlot::Active(session) => Some(session.job_id()),
            _ => None,
        }
    }
}

/// Merges a freshly fetched job into the last observed one
///
/// Returns `None` when `next` would move the status backwards. Progress
/// counters of a running job never decrease.
pub(crate) fn reconcile(previous: Option<&ExportJob>, mut next: ExportJob) -> Option<ExportJob> {
    let Some(previous) = previous.filter(|p| p.id == next.id) else {
        return Some(next);
    };

    if !previous.status.can_transition_to(next.status) {
        tracing::warn!(
            job_id = %next.id,
            from = %previous.status,
            to = %next.status,
            "Ignoring out-of-order export status"
        );
        return None;
    }

    if previous.status != next.status {
        crate::log_status_transition!(next.id, Some(previous.status), next.status);
    }

    next.hold_progress_floor(previous);
    Some(next)
}
