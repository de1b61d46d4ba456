//! Report renderers.

pub mod tree;

pub use tree::render_text_report;

use crate::view::ReportData;

/// Pretty JSON, stable across runs (all maps are ordered).
pub fn render_json_report(data: &ReportData) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    Ok(json)
}
