//! Export job model
//!
//! An [`ExportJob`] is the status document returned by the backend for one
//! bulk export. It is immutable per fetch; the poller compares consecutive
//! values to drive its state machine.

use super::ids::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an export job
///
/// Statuses only move forward: `Pending -> Running -> {Completed | Failed}`,
/// and `Pending` may fail directly. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExportStatus {
    /// Job is queued
    Pending,
    /// Job is streaming rows
    Running,
    /// Export file is uploaded and downloadable
    Completed,
    /// Job aborted; `error_message` says why
    Failed,
}

impl ExportStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Pending => "PENDING",
            ExportStatus::Running => "RUNNING",
            ExportStatus::Completed => "COMPLETED",
            ExportStatus::Failed => "FAILED",
        }
    }

    /// True for `Completed` and `Failed`
    pub fn is_terminal(&self) -> bool {
        match self {
            ExportStatus::Completed | ExportStatus::Failed => true,
            ExportStatus::Pending | ExportStatus::Running => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ExportStatus::Pending => 0,
            ExportStatus::Running => 1,
            ExportStatus::Completed | ExportStatus::Failed => 2,
        }
    }

    /// Whether observing `next` after `self` is a legal transition
    ///
    /// Staying in the same status is legal. A terminal status never changes.
    pub fn can_transition_to(&self, next: ExportStatus) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ExportStatus::Pending),
            "RUNNING" => Ok(ExportStatus::Running),
            "COMPLETED" => Ok(ExportStatus::Completed),
            "FAILED" => Ok(ExportStatus::Failed),
            other => Err(format!("Unrecognized export status '{other}'")),
        }
    }
}

impl TryFrom<String> for ExportStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExportStatus> for String {
    fn from(status: ExportStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Metrics reported for a completed export
///
/// All fields are `None` until the job reaches `Completed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetrics {
    /// Compressed file size in bytes
    #[serde(default)]
    pub file_size_bytes: Option<u64>,

    #[serde(default)]
    pub file_size_formatted: Option<String>,

    /// Size before gzip
    #[serde(default)]
    pub uncompressed_size_bytes: Option<u64>,

    #[serde(default)]
    pub uncompressed_size_formatted: Option<String>,

    /// Space saved by compression, in percent
    #[serde(default)]
    pub compression_percent: Option<f64>,

    #[serde(default)]
    pub rows_per_second: Option<f64>,

    #[serde(default)]
    pub duration_ms: Option<u64>,

    #[serde(default)]
    pub duration_formatted: Option<String>,
}

impl JobMetrics {
    /// True when the backend has not reported any metric
    pub fn is_empty(&self) -> bool {
        self == &JobMetrics::default()
    }
}

/// Status document for one export job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    /// Backend-assigned job id
    pub id: JobId,

    pub status: ExportStatus,

    /// Total rows to export; unknown until the count query finishes
    #[serde(default)]
    pub total_records: Option<u64>,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub processed_records: u64,

    #[serde(default)]
    pub progress_percent: Option<u32>,

    /// Object key of the uploaded file
    #[serde(default)]
    pub s3_key: Option<String>,

    /// Present iff the job failed
    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub metrics: JobMetrics,
}

impl ExportJob {
    /// Creates a job document with only the identity and status set
    pub fn new(id: JobId, status: ExportStatus) -> Self {
        Self {
            id,
            status,
            total_records: None,
            processed_records: 0,
            progress_percent: None,
            s3_key: None,
            error_message: None,
            created_at: None,
            started_at: None,
            finished_at: None,
            metrics: JobMetrics::default(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExportStatus::Completed
    }

    /// Progress as reported, or derived from the record counters
    pub fn progress_percent_or_computed(&self) -> u32 {
        if let Some(percent) = self.progress_percent {
            return percent.min(100);
        }
        match self.total_records {
            Some(total) if total > 0 => {
                (u128::from(self.processed_records.min(total)) * 100 / u128::from(total)) as u32
            }
            _ => 0,
        }
    }

    /// Keeps progress counters from moving backwards relative to `previous`
    ///
    /// Only applies when both documents describe the same job and this one is
    /// still running.
    pub fn hold_progress_floor(&mut self, previous: &ExportJob) {
        if self.id != previous.id || self.status != ExportStatus::Running {
            return;
        }
        self.processed_records = self.processed_records.max(previous.processed_records);
        self.progress_percent = match (self.progress_percent, previous.progress_percent) {
            (Some(current), Some(prev)) => Some(current.max(prev)),
            (None, prev) => prev,
            (current, None) => current,
        };
        if self.total_records.is_none() {
            self.total_records = previous.total_records;
        }
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}
