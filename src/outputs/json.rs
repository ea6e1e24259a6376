//! JSON report output.
//!
//! The report is written to `{output_dir}/{reference_date}/{site}_{phrase}.json`
//! and contains the search parameters followed by the article records.

use super::{report_dir, report_stem};
use crate::models::SearchReport;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`SearchReport`] as pretty-printed JSON.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_report(report: &SearchReport, output_dir: &str) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let dir = report_dir(report, output_dir);
    info!(%dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(%dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = format!("{}/{}.json", dir, report_stem(report));
    fs::write(&path, json).await?;
    info!(%path, articles = report.articles.len(), "Wrote JSON report");

    Ok(path)
}
