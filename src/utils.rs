//! Small helpers for log formatting, run timestamps and output directories.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backing off to a char boundary) with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// `<prefix>_<YYYYMMDD_HHMMSS>` for the given local time.
pub fn timestamped_name(prefix: &str, now: &DateTime<Local>) -> String {
    format!("{}_{}", prefix, now.format("%Y%m%d_%H%M%S"))
}

/// Create (if needed) the per-run directory `<parent>/<prefix>_<timestamp>`.
#[instrument(level = "info", skip(parent, now))]
pub async fn create_run_dir(parent: &Path, prefix: &str, now: &DateTime<Local>) -> Result<PathBuf> {
    let dir = parent.join(timestamped_name(prefix, now));
    if !fs::try_exists(&dir).await? {
        fs::create_dir_all(&dir).await?;
        info!(path = %dir.display(), "Created image directory");
    }
    Ok(dir)
}
