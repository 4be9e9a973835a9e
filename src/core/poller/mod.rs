//! Export job poller
//!
//! [`ExportPoller`] creates an export job, polls its status on a fixed
//! interval until it reaches a terminal state, and publishes every applied
//! result as a [`PollerSnapshot`] on a watch channel.
//!
//! At most one polling session exists per poller. A session is torn down
//! before a terminal status is published, so no fetch is ever issued after
//! `COMPLETED` or `FAILED` has been observed.
//!
//! # Example
//!
//! ```rust,no_run
//! use exportwatch::adapters::exports::HttpExportApi;
//! use exportwatch::config::BackendConfig;
//! use exportwatch::core::poller::ExportPoller;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpExportApi::new(BackendConfig::default())?;
//! let poller = ExportPoller::new(api, Duration::from_secs(1));
//!
//! let job_id = poller.start().await?;
//! let finished = poller.wait_until_idle().await;
//!
//! if finished.job.as_ref().is_some_and(|job| job.is_completed()) {
//!     println!("{}", poller.get_download_url(&job_id).await?);
//! }
//! # Ok(())
//! # }
//! ```

mod session;
pub mod snapshot;

pub use snapshot::PollerSnapshot;

use crate::adapters::exports::ExportApi;
use crate::config::PollerConfig;
use crate::domain::{ApiError, ExportJob, JobId, PollerError};
use session::{reconcile, PollSession, SessionSlot};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Polls one export job at a time
///
/// Cloning is cheap; clones share the same session and state.
pub struct ExportPoller<A: ExportApi> {
    inner: Arc<Inner<A>>,
}

impl<A: ExportApi> Clone for ExportPoller<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<A> {
    api: A,
    interval: Duration,
    slot: Mutex<SessionSlot>,
    state: watch::Sender<PollerSnapshot>,
    generations: AtomicU64,
}

impl<A: ExportApi + 'static> ExportPoller<A> {
    /// Create a poller that fetches status every `interval`
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(api: A, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!("Poll interval of zero raised to {}ms", MIN_INTERVAL.as_millis());
            MIN_INTERVAL
        } else {
            interval
        };
        let (state, _) = watch::channel(PollerSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                api,
                interval,
                slot: Mutex::new(SessionSlot::Idle),
                state,
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn from_config(api: A, config: &PollerConfig) -> Self {
        Self::new(api, Duration::from_millis(config.interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.inner.state.subscribe()
    }

    /// Current state
    pub fn snapshot(&self) -> PollerSnapshot {
        self.inner.state.borrow().clone()
    }

    /// True while a start is in flight or a session is polling
    pub fn is_active(&self) -> bool {
        !self.inner.lock_slot().is_idle()
    }

    /// Job id of the polling session, if one is running
    pub fn active_job_id(&self) -> Option<JobId> {
        self.inner.lock_slot().job_id().cloned()
    }

    /// Creates an export job and begins polling it
    ///
    /// One status fetch is made right away to seed state. When that fetch
    /// is already terminal no polling loop is started.
    ///
    /// # Errors
    ///
    /// - `SessionAlreadyActive` while another start or session is running
    /// - `StartFailed` when the backend rejects job creation
    pub async fn start(&self) -> Result<JobId, PollerError> {
        let generation = self.inner.reserve()?;
        let release = SlotRelease::new(&self.inner, generation);

        let started = match self.inner.api.start_export().await {
            Ok(started) => started,
            Err(e) => {
                release.disarm();
                let error = PollerError::StartFailed(e);
                tracing::error!(error = %error, "Export job could not be created");
                self.inner.abandon_start(generation, error.clone());
                return Err(error);
            }
        };
        let job_id = started.job_id;
        tracing::info!(job_id = %job_id, "Export job started");

        let seed = self.inner.api.get_status(&job_id).await;
        release.disarm();
        let mut slot = self.inner.lock_slot();
        if !slot.is_generation(generation) {
            tracing::info!(job_id = %job_id, "Export stopped before polling began");
            return Ok(job_id);
        }

        match seed {
            Ok(job) if job.is_terminal() => {
                *slot = SessionSlot::Idle;
                drop(slot);
                tracing::info!(job_id = %job_id, status = %job.status, "Export already finished");
                self.inner.publish(|s| {
                    s.job = Some(job);
                    s.error = None;
                    s.in_progress = false;
                });
                return Ok(job_id);
            }
            Ok(job) => self.inner.publish(|s| {
                s.job = Some(job);
                s.error = None;
            }),
            Err(e) if !e.is_recoverable() => {
                *slot = SessionSlot::Idle;
                drop(slot);
                self.inner.fail_session(&job_id, e);
                return Ok(job_id);
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Initial status fetch failed");
                self.inner.publish(|s| s.error = Some(PollerError::PollFailed(e)));
            }
        }

        let (session, cancel) = PollSession::new(job_id.clone(), generation);
        *slot = SessionSlot::Active(session);
        drop(slot);

        tokio::spawn(run_session(
            Arc::clone(&self.inner),
            job_id.clone(),
            generation,
            cancel,
        ));

        Ok(job_id)
    }

    /// Fetches the status of `job_id` once
    ///
    /// While no session is active the result also becomes the observed job,
    /// which is what [`get_download_url`](Self::get_download_url) checks.
    ///
    /// # Errors
    ///
    /// Returns `PollFailed` if the fetch fails. The last observed job is kept.
    pub async fn poll(&self, job_id: &JobId) -> Result<ExportJob, PollerError> {
        match self.inner.api.get_status(job_id).await {
            Ok(job) => {
                if self.inner.lock_slot().is_idle() {
                    let previous = self.inner.state.borrow().job.clone();
                    if let Some(job) = reconcile(previous.as_ref(), job.clone()) {
                        self.inner.publish(|s| {
                            s.job = Some(job);
                            s.error = None;
                        });
                    }
                }
                Ok(job)
            }
            Err(e) => {
                let error = PollerError::PollFailed(e);
                self.inner.publish(|s| s.error = Some(error.clone()));
                Err(error)
            }
        }
    }

    /// Cancels the polling session
    ///
    /// Safe to call at any time and any number of times. An in-flight fetch
    /// is abandoned and its result discarded.
    pub fn stop(&self) {
        let previous = std::mem::take(&mut *self.inner.lock_slot());
        match previous {
            SessionSlot::Idle => return,
            SessionSlot::Starting { .. } => {
                tracing::info!("Export start cancelled");
            }
            SessionSlot::Active(session) => {
                session.cancel();
                tracing::info!(job_id = %session.job_id(), "Export polling stopped");
            }
        }
        self.inner.publish(|s| s.in_progress = false);
    }

    /// Requests a fresh download URL for a completed job
    ///
    /// The URL is never cached; every call hits the backend.
    ///
    /// # Errors
    ///
    /// - `JobNotCompleted` unless the last observed job is `job_id` and
    ///   completed
    /// - `DownloadUrlFailed` when the backend request fails
    pub async fn get_download_url(&self, job_id: &JobId) -> Result<String, PollerError> {
        let completed = self
            .inner
            .state
            .borrow()
            .job
            .as_ref()
            .is_some_and(|job| &job.id == job_id && job.is_completed());

        if !completed {
            return Err(PollerError::JobNotCompleted {
                job_id: job_id.to_string(),
            });
        }

        match self.inner.api.get_download_url(job_id).await {
            Ok(response) => Ok(response.download_url),
            Err(e) => {
                let error = PollerError::DownloadUrlFailed(e);
                tracing::warn!(job_id = %job_id, error = %error, "Download URL request failed");
                self.inner.publish(|s| s.error = Some(error.clone()));
                Err(error)
            }
        }
    }

    /// Waits until no start or session is in progress
    pub async fn wait_until_idle(&self) -> PollerSnapshot {
        let mut rx = self.subscribe();
        let snapshot = match rx.wait_for(|s| !s.in_progress).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }
}

impl<A> Inner<A> {
    fn lock_slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, update: impl FnOnce(&mut PollerSnapshot)) {
        self.state.send_modify(update);
    }

    /// Claims the session slot for a new start
    fn reserve(&self) -> Result<u64, PollerError> {
        let mut slot = self.lock_slot();
        if !slot.is_idle() {
            return Err(PollerError::SessionAlreadyActive {
                job_id: slot.job_id().map(ToString::to_string),
            });
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        *slot = SessionSlot::Starting { generation };
        drop(slot);

        self.publish(|s| {
            s.job = None;
            s.error = None;
            s.in_progress = true;
        });
        Ok(generation)
    }

    fn abandon_start(&self, generation: u64, error: PollerError) {
        let mut slot = self.lock_slot();
        if !slot.is_generation(generation) {
            return;
        }
        *slot = SessionSlot::Idle;
        drop(slot);
        self.publish(|s| {
            s.error = Some(error);
            s.in_progress = false;
        });
    }

    /// Frees the slot if it still belongs to `generation`
    fn release(&self, generation: u64) {
        let mut slot = self.lock_slot();
        if !slot.is_generation(generation) {
            return;
        }
        *slot = SessionSlot::Idle;
        drop(slot);
        tracing::warn!(generation, "Export session released before it finished");
        self.publish(|s| s.in_progress = false);
    }

    /// Publishes an unrecoverable fetch failure; the slot must already be idle
    fn fail_session(&self, job_id: &JobId, error: ApiError) {
        let error = PollerError::PollFailed(error);
        let context = format!("Polling of export {job_id} abandoned");
        crate::log_error_with_context!(&error, context.as_str());
        self.publish(|s| {
            s.error = Some(error);
            s.in_progress = false;
        });
    }

    /// Applies one scheduled fetch; `Break` ends the loop
    fn apply_poll(
        &self,
        job_id: &JobId,
        generation: u64,
        result: Result<ExportJob, ApiError>,
    ) -> ControlFlow<()> {
        let mut slot = self.lock_slot();
        if !slot.is_generation(generation) {
            return ControlFlow::Break(());
        }

        match result {
            Ok(job) => {
                let previous = self.state.borrow().job.clone();
                let Some(job) = reconcile(previous.as_ref(), job) else {
                    return ControlFlow::Continue(());
                };

                if job.is_terminal() {
                    *slot = SessionSlot::Idle;
                    drop(slot);
                    tracing::info!(job_id = %job_id, status = %job.status, "Export finished");
                    self.publish(|s| {
                        s.job = Some(job);
                        s.error = None;
                        s.in_progress = false;
                    });
                    return ControlFlow::Break(());
                }

                drop(slot);
                self.publish(|s| {
                    s.job = Some(job);
                    s.error = None;
                });
                ControlFlow::Continue(())
            }
            Err(e) if !e.is_recoverable() => {
                *slot = SessionSlot::Idle;
                drop(slot);
                self.fail_session(job_id, e);
                ControlFlow::Break(())
            }
            Err(e) => {
                drop(slot);
                tracing::warn!(job_id = %job_id, error = %e, "Status fetch failed, retrying on next tick");
                self.publish(|s| s.error = Some(PollerError::PollFailed(e)));
                ControlFlow::Continue(())
            }
        }
    }
}

/// Releases the slot of one generation when dropped while armed
///
/// Covers a `start` future dropped between its awaits and a polling task
/// that unwinds.
struct SlotRelease<'a, A> {
    inner: &'a Inner<A>,
    generation: u64,
    armed: bool,
}

impl<'a, A> SlotRelease<'a, A> {
    fn new(inner: &'a Inner<A>, generation: u64) -> Self {
        Self {
            inner,
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<A> Drop for SlotRelease<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.release(self.generation);
        }
    }
}

/// Interval loop of one session
///
/// The next tick is only awaited after the previous fetch has been applied,
/// and ticks missed meanwhile are skipped.
async fn run_session<A: ExportApi>(
    inner: Arc<Inner<A>>,
    job_id: JobId,
    generation: u64,
    mut cancel: watch::Receiver<bool>,
) {
    let _release = SlotRelease::new(&inner, generation);
    let period = inner.interval;
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }

        tick += 1;
        crate::log_poll_tick!(job_id, tick);

        let result = tokio::select! {
            biased;
            _ = cancel.changed() => break,
            result = inner.api.get_status(&job_id) => result,
        };

        if inner.apply_poll(&job_id, generation, result).is_break() {
            break;
        }
    }

    tracing::debug!(job_id = %job_id, ticks = tick, "Polling loop exited");
}
