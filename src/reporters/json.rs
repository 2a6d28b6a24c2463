//! JSON reporter
//!
//! Outputs the full RunReport as pretty-printed JSON. This is also the
//! rendition persisted under `.lintsweep/reports/`.

use crate::reporters::RunReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
