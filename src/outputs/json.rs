//! JSON run report.
//!
//! Written only when `--report-json` (or `report_json` in the settings file)
//! names a path. Parent directories are created as needed and an existing
//! file is replaced.

use crate::error::Result;
use crate::models::RunReport;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[instrument(level = "info", skip(report), fields(articles = report.articles.len()))]
pub async fn write_report(report: &RunReport, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(path, "Wrote JSON report");
    Ok(())
}
