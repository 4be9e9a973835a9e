//! Human-readable rendering of job and process figures

use chrono::{DateTime, Utc};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Placeholder for values that are not known yet
pub const NOT_AVAILABLE: &str = "-";

/// Formats a byte count as B, KB or MB (1024 base)
pub fn format_file_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size >= MIB {
        format!("{:.2} MB", size / MIB)
    } else if size >= KIB {
        format!("{:.2} KB", size / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats milliseconds as `"Ns"` or `"Mm Ss"`
pub fn format_duration_ms(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

/// Time between `started` and `finished`, or `now` for a running job
pub fn format_elapsed(
    started: Option<DateTime<Utc>>,
    finished: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let Some(started) = started else {
        return NOT_AVAILABLE.to_string();
    };
    let end = finished.unwrap_or(now);
    let ms = (end - started).num_milliseconds().max(0) as u64;
    format_duration_ms(ms)
}

pub fn format_speed(rows_per_second: Option<f64>) -> String {
    match rows_per_second {
        Some(rps) if rps >= 1000.0 => format!("{:.1}K rows/s", rps / 1000.0),
        Some(rps) if rps > 0.0 => format!("{rps:.0} rows/s"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_compression(percent: Option<f64>) -> String {
    match percent {
        Some(pct) => format!("{pct:.1}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Formats seconds of uptime as `"Hh Mm Ss"`
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

/// Text progress bar, `width` cells wide
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
