//! Integration tests for the export poller
//!
//! The backend is replaced by a scripted [`ExportApi`] fed with the same JSON
//! documents the export endpoints return. Time is paused so interval ticks
//! are deterministic.

use async_trait::async_trait;
use exportwatch::adapters::exports::{DownloadUrlResponse, ExportApi, StartExportResponse};
use exportwatch::core::poller::ExportPoller;
use exportwatch::domain::{ApiError, ApiErrorKind, ExportJob, ExportStatus, JobId, PollerError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const INTERVAL: Duration = Duration::from_millis(1000);

struct State {
    statuses: Mutex<VecDeque<Result<ExportJob, ApiError>>>,
    status_fetches: AtomicUsize,
    url_fetches: AtomicUsize,
}

/// Backend double; the last scripted status repeats forever
#[derive(Clone)]
struct ScriptedApi {
    state: Arc<State>,
}

impl ScriptedApi {
    fn new(statuses: Vec<Result<ExportJob, ApiError>>) -> Self {
        Self {
            state: Arc::new(State {
                statuses: Mutex::new(statuses.into()),
                status_fetches: AtomicUsize::new(0),
                url_fetches: AtomicUsize::new(0),
            }),
        }
    }

    fn status_fetches(&self) -> usize {
        self.state.status_fetches.load(Ordering::SeqCst)
    }

    fn url_fetches(&self) -> usize {
        self.state.url_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExportApi for ScriptedApi {
    async fn start_export(&self) -> Result<StartExportResponse, ApiError> {
        Ok(serde_json::from_str(
            r#"{"jobId":"exp-42","message":"Export started","statusUrl":"/exports/exp-42"}"#,
        )
        .unwrap())
    }

    async fn get_status(&self, job_id: &JobId) -> Result<ExportJob, ApiError> {
        assert_eq!(job_id.as_str(), "exp-42");
        self.state.status_fetches.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.state.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap()
        }
    }

    async fn get_download_url(&self, job_id: &JobId) -> Result<DownloadUrlResponse, ApiError> {
        let n = self.state.url_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DownloadUrlResponse {
            download_url: format!("https://bucket.example.com/exports/{job_id}.csv.gz?X-Amz-Signature={n}"),
        })
    }
}

fn doc(json: &str) -> Result<ExportJob, ApiError> {
    Ok(serde_json::from_str(json).unwrap())
}

fn pending() -> Result<ExportJob, ApiError> {
    doc(r#"{"id":"exp-42","status":"PENDING","processedRecords":0}"#)
}

fn running_half() -> Result<ExportJob, ApiError> {
    doc(
        r#"{"id":"exp-42","status":"RUNNING","totalRecords":1000,"processedRecords":500,"progressPercent":50,"startedAt":"2025-03-01T10:00:00Z"}"#,
    )
}

fn completed() -> Result<ExportJob, ApiError> {
    doc(
        r#"{
            "id":"exp-42",
            "status":"COMPLETED",
            "totalRecords":1000,
            "processedRecords":1000,
            "progressPercent":100,
            "s3Key":"exports/exp-42.csv.gz",
            "startedAt":"2025-03-01T10:00:00Z",
            "finishedAt":"2025-03-01T10:00:02Z",
            "fileSizeBytes":2411724,
            "fileSizeFormatted":"2.3 MB",
            "durationMs":2000
        }"#,
    )
}

fn unavailable() -> Result<ExportJob, ApiError> {
    Err(ApiError::new(
        ApiErrorKind::Status,
        503,
        "Service Unavailable",
        "req-7f3a",
    ))
}

fn exp_42() -> JobId {
    JobId::new("exp-42").unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_export_runs_to_completion() {
    let api = ScriptedApi::new(vec![pending(), running_half(), completed()]);
    let poller = ExportPoller::new(api.clone(), INTERVAL);

    let mut rx = poller.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen: Vec<ExportStatus> = Vec::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if let Some(job) = &snapshot.job {
                if seen.last() != Some(&job.status) {
                    seen.push(job.status);
                }
            }
            if snapshot.is_finished() {
                break;
            }
        }
        seen
    });

    let job_id = poller.start().await.unwrap();
    assert_eq!(job_id, exp_42());
    assert!(poller.is_active());

    let seen = observer.await.unwrap();
    assert_eq!(
        seen,
        vec![
            ExportStatus::Pending,
            ExportStatus::Running,
            ExportStatus::Completed
        ]
    );

    let snapshot = poller.snapshot();
    assert!(!snapshot.in_progress);
    assert!(snapshot.error.is_none());
    let job = snapshot.job.unwrap();
    assert_eq!(job.processed_records, 1000);
    assert_eq!(job.total_records, Some(1000));
    assert_eq!(job.metrics.file_size_formatted.as_deref(), Some("2.3 MB"));
    assert_eq!(api.status_fetches(), 3);

    // No fetch after the terminal status
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(api.status_fetches(), 3);

    let url = poller.get_download_url(&job_id).await.unwrap();
    assert!(url.contains("exp-42.csv.gz"));
    assert_eq!(api.url_fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_seed_never_polls() {
    let api = ScriptedApi::new(vec![doc(
        r#"{"id":"exp-42","status":"FAILED","processedRecords":120,"errorMessage":"db timeout"}"#,
    )]);
    let poller = ExportPoller::new(api.clone(), INTERVAL);

    let job_id = poller.start().await.unwrap();
    assert!(!poller.is_active());

    let snapshot = poller.snapshot();
    assert!(snapshot.is_finished());
    let job = snapshot.job.unwrap();
    assert_eq!(job.status, ExportStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("db timeout"));

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(api.status_fetches(), 1);

    let err = poller.get_download_url(&job_id).await.unwrap_err();
    assert!(matches!(err, PollerError::JobNotCompleted { .. }));
    assert_eq!(api.url_fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_polling_is_rejected() {
    let api = ScriptedApi::new(vec![running_half()]);
    let poller = ExportPoller::new(api.clone(), INTERVAL);

    poller.start().await.unwrap();
    let err = poller.start().await.unwrap_err();

    assert_eq!(err.to_string(), "An export is already in progress (job exp-42)");
    assert_eq!(poller.active_job_id(), Some(exp_42()));
    assert_eq!(api.status_fetches(), 1);

    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let api = ScriptedApi::new(vec![running_half()]);
    let poller = ExportPoller::new(api.clone(), INTERVAL);

    // Never started
    poller.stop();
    poller.stop();
    assert!(!poller.is_active());

    poller.start().await.unwrap();
    tokio::time::sleep(INTERVAL * 2 + INTERVAL / 2).await;
    assert_eq!(api.status_fetches(), 3);

    poller.stop();
    poller.stop();
    assert!(!poller.is_active());
    assert!(!poller.snapshot().in_progress);

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(api.status_fetches(), 3);

    // A stopped poller can start again
    poller.start().await.unwrap();
    assert!(poller.is_active());
    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_keeps_last_job() {
    let api = ScriptedApi::new(vec![running_half(), unavailable(), completed()]);
    let poller = ExportPoller::new(api.clone(), INTERVAL);

    poller.start().await.unwrap();
    tokio::time::sleep(INTERVAL + INTERVAL / 2).await;

    let snapshot = poller.snapshot();
    assert!(snapshot.in_progress);
    assert_eq!(
        snapshot.error_message().as_deref(),
        Some("Service Unavailable (support code: req-7f3a)")
    );
    let job = snapshot.job.unwrap();
    assert_eq!(job.status, ExportStatus::Running);
    assert_eq!(job.processed_records, 500);

    let finished = poller.wait_until_idle().await;
    assert!(finished.is_finished());
    assert!(finished.error.is_none());
    assert_eq!(api.status_fetches(), 3);
}

#[tokio::test]
async fn test_download_url_after_one_shot_poll() {
    let api = ScriptedApi::new(vec![completed()]);
    let poller = ExportPoller::new(api.clone(), INTERVAL);
    let job_id = exp_42();

    assert!(matches!(
        poller.get_download_url(&job_id).await,
        Err(PollerError::JobNotCompleted { .. })
    ));

    let job = poller.poll(&job_id).await.unwrap();
    assert!(job.is_completed());

    let first = poller.get_download_url(&job_id).await.unwrap();
    let second = poller.get_download_url(&job_id).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(api.url_fetches(), 2);
}
