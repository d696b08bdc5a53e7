//! Raster export: the SVG document rendered through `resvg`.

use super::{ExportError, PNG_SCALE, svg};
use crate::theme::Theme;

/// Render `snapshot` to PNG bytes at [`PNG_SCALE`].
pub fn render(snapshot: &canvas::doc::GraphSnapshot, theme: Theme) -> Result<Vec<u8>, ExportError> {
    let document = svg::render(snapshot, theme)?;
    svg_to_png(&document, PNG_SCALE)
}

/// Rasterize an SVG string. The background comes from the document itself.
pub fn svg_to_png(document: &str, scale: f32) -> Result<Vec<u8>, ExportError> {
    let pixmap = svg_to_pixmap(document, scale)?;
    pixmap.encode_png().map_err(|e| ExportError::PngEncode(e.to_string()))
}

fn svg_to_pixmap(document: &str, scale: f32) -> Result<tiny_skia::Pixmap, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_owned();

    let tree = usvg::Tree::from_str(document, &opt).map_err(|e| ExportError::SvgParse(e.to_string()))?;

    let size = tree.size();
    let width = pixel_extent(size.width(), scale);
    let height = pixel_extent(size.height(), scale);

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(ExportError::PixmapAlloc { width, height })?;
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_extent(logical: f32, scale: f32) -> u32 {
    (logical * scale).ceil().max(1.0) as u32
}

#[cfg(test)]
#[path = "png_test.rs"]
mod tests;
