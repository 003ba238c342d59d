//! Structured (JSON) export for impact reports
//!
//! The export is the report itself: file → ordered blocks, every record a
//! flat object with the model's field names.

use super::types::ImpactReport;
use crate::error::Result;

/// Serialize the report to a JSON value
pub fn report_to_json(report: &ImpactReport) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(report)?)
}

/// Pretty-printed JSON text, newline-terminated
pub fn report_to_json_string(report: &ImpactReport) -> Result<String> {
    let mut text = serde_json::to_string_pretty(report)?;
    text.push('\n');
    Ok(text)
}

/// Parse a previously exported report
pub fn report_from_json(text: &str) -> Result<ImpactReport> {
    Ok(serde_json::from_str(text)?)
}
