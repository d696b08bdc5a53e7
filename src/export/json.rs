//! JSON export: `{nodes, edges, exportedAt}`, pretty printed.

use canvas::doc::{GraphSnapshot, PositionedEdge, PositionedNode};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::ExportError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    nodes: &'a [PositionedNode],
    edges: &'a [PositionedEdge],
    exported_at: String,
}

pub fn render(snapshot: &GraphSnapshot) -> Result<String, ExportError> {
    render_at(snapshot, OffsetDateTime::now_utc())
}

/// Render with an explicit timestamp.
pub fn render_at(snapshot: &GraphSnapshot, at: OffsetDateTime) -> Result<String, ExportError> {
    let payload = JsonExport { nodes: &snapshot.nodes, edges: &snapshot.edges, exported_at: at.format(&Rfc3339)? };
    Ok(serde_json::to_string_pretty(&payload)?)
}

#[cfg(test)]
#[path = "json_test.rs"]
mod tests;
