//! Export of the current snapshot as SVG, PNG or JSON.
//!
//! DESIGN
//! ======
//! Exporters are pure: they read a [`GraphSnapshot`] and a [`Theme`] and
//! return bytes. Writing files or triggering downloads is the host's job,
//! so the only file-system concern here is [`file_name`].
//!
//! The vector document is built from node positions directly rather than
//! from whatever the rendering substrate draws, so SVG and PNG exports are
//! identical across hosts. PNG is that same document rasterized at
//! [`PNG_SCALE`].

pub mod json;
pub mod png;
pub mod svg;

use canvas::consts::{NODE_HEIGHT, NODE_WIDTH};
use canvas::doc::GraphSnapshot;
use canvas::geometry::Bounds;
use tracing::info;

use crate::error::ErrorCode;
use crate::theme::Theme;

/// Space between the node bounding box and the document edge.
pub const EXPORT_PADDING: f64 = 50.0;

/// Supersampling factor for raster export.
pub const PNG_SCALE: f32 = 2.0;

/// Fallback base name when the display name has no usable characters.
const DEFAULT_FILE_STEM: &str = "diagram";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Svg,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Json => "json",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Json => "application/json",
        }
    }

    /// Upper-case label used in status messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
            Self::Json => "JSON",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: the diagram has no nodes")]
    Empty,
    #[error("failed to parse generated SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    #[error("failed to serialize diagram: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to format export timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_EXPORT_EMPTY",
            Self::SvgParse(_) => "E_EXPORT_SVG",
            Self::PixmapAlloc { .. } | Self::PngEncode(_) => "E_EXPORT_PNG",
            Self::Json(_) | Self::Timestamp(_) => "E_EXPORT_JSON",
        }
    }
}

/// A finished export ready to hand to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Exported {
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Download name for a diagram: every non-alphanumeric character becomes
/// `-`, the result is lower-cased, and the extension is appended.
#[must_use]
pub fn file_name(display_name: &str, format: ExportFormat) -> String {
    let stem: String = display_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = if stem.is_empty() { DEFAULT_FILE_STEM } else { stem.as_str() };
    format!("{stem}.{}", format.extension())
}

/// Node bounding box grown by [`EXPORT_PADDING`]. `None` for an empty graph.
#[must_use]
pub fn diagram_bounds(snapshot: &GraphSnapshot) -> Option<Bounds> {
    Bounds::enclosing(snapshot.nodes.iter().map(|n| n.position), NODE_WIDTH, NODE_HEIGHT)
        .map(|b| b.padded(EXPORT_PADDING))
}

/// Export `snapshot` in `format`, naming the result after `display_name`.
pub fn export(
    snapshot: &GraphSnapshot,
    theme: Theme,
    display_name: &str,
    format: ExportFormat,
) -> Result<Exported, ExportError> {
    let bytes = match format {
        ExportFormat::Svg => svg::render(snapshot, theme)?.into_bytes(),
        ExportFormat::Png => png::render(snapshot, theme)?,
        ExportFormat::Json => json::render(snapshot)?.into_bytes(),
    };
    let file_name = file_name(display_name, format);
    info!(format = format.label(), %file_name, bytes = bytes.len(), "export: rendered");
    Ok(Exported { format, file_name, bytes })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
