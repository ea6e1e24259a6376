//! Report writers for scraped articles.
//!
//! # Submodules
//!
//! - [`json`]: Writes a [`SearchReport`] to a JSON file
//! - [`markdown`]: Renders a [`SearchReport`] as a Markdown table
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── 2024-06-15/
//!     ├── latimes_climate-change.json
//!     └── latimes_climate-change.md
//! ```

use crate::models::SearchReport;
use crate::utils::slugify;

pub mod json;
pub mod markdown;

/// Directory of a report below `output_dir`.
pub fn report_dir(report: &SearchReport, output_dir: &str) -> String {
    format!("{}/{}", output_dir.trim_end_matches('/'), report.reference_date)
}

/// File name of a report without extension, e.g. `latimes_climate-change`.
pub fn report_stem(report: &SearchReport) -> String {
    format!("{}_{}", report.site, slugify(&report.search_phrase))
}
