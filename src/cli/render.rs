//! Terminal rendering of export jobs

use crate::core::format::{
    format_compression, format_elapsed, format_file_size, format_speed, progress_bar,
    NOT_AVAILABLE,
};
use crate::domain::{ExportJob, ExportStatus};
use chrono::{DateTime, Utc};

const BAR_WIDTH: usize = 30;

/// One-line progress view, e.g. `[#####....]  50%  500/1000 records  RUNNING`
pub fn progress_line(job: &ExportJob) -> String {
    let percent = job.progress_percent_or_computed();
    let records = match job.total_records {
        Some(total) => format!("{}/{} records", job.processed_records, total),
        None => format!("{} records", job.processed_records),
    };
    format!(
        "{} {:>3}%  {}  {}",
        progress_bar(percent, BAR_WIDTH),
        percent,
        records,
        job.status
    )
}

fn file_size_text(bytes: Option<u64>, formatted: Option<&str>) -> String {
    match (formatted, bytes) {
        (Some(text), _) => text.to_string(),
        (None, Some(bytes)) => format_file_size(bytes),
        (None, None) => NOT_AVAILABLE.to_string(),
    }
}

/// Multi-line description of a job
pub fn job_summary_lines(job: &ExportJob, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![
        format!("  Job ID: {}", job.id),
        format!("  Status: {}", job.status),
        format!("  Progress: {}", progress_line(job)),
        format!(
            "  Duration: {}",
            format_elapsed(job.started_at, job.finished_at, now)
        ),
    ];

    if let Some(created) = job.created_at {
        lines.push(format!("  Created: {}", created.to_rfc3339()));
    }

    match job.status {
        ExportStatus::Completed => {
            let metrics = &job.metrics;
            if let Some(key) = &job.s3_key {
                lines.push(format!("  File: {key}"));
            }
            lines.push(format!(
                "  Size: {}",
                file_size_text(
                    metrics.file_size_bytes,
                    metrics.file_size_formatted.as_deref()
                )
            ));
            lines.push(format!(
                "  Uncompressed: {}",
                file_size_text(
                    metrics.uncompressed_size_bytes,
                    metrics.uncompressed_size_formatted.as_deref()
                )
            ));
            lines.push(format!(
                "  Compression: {}",
                format_compression(metrics.compression_percent)
            ));
            lines.push(format!("  Speed: {}", format_speed(metrics.rows_per_second)));
        }
        ExportStatus::Failed => {
            lines.push(format!(
                "  Error: {}",
                job.error_message.as_deref().unwrap_or("Unknown error")
            ));
        }
        ExportStatus::Pending | ExportStatus::Running => {}
    }

    lines
}
