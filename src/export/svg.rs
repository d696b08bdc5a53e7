//! Vector export.

use std::collections::HashMap;

use ::svg::Document;
use ::svg::node::element::{Group, Image, Path, Rectangle, Text};
use canvas::consts::{NODE_HEIGHT, NODE_WIDTH};
use canvas::doc::{GraphSnapshot, PositionedEdge, PositionedNode};
use canvas::geometry::{Bounds, Point};

use super::{ExportError, diagram_bounds};
use crate::theme::{Theme, ThemeColors};

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";
const FONT_SIZE: f64 = 14.0;
const CORNER_RADIUS: f64 = 8.0;
const BORDER_WIDTH: f64 = 2.0;
const IMAGE_HEIGHT: f64 = 28.0;

/// Render `snapshot` as a standalone SVG document string.
///
/// The document origin is the top-left of the padded node bounding box, so
/// every world coordinate is shifted by `(-bounds.x, -bounds.y)`.
pub fn render(snapshot: &GraphSnapshot, theme: Theme) -> Result<String, ExportError> {
    let bounds = diagram_bounds(snapshot).ok_or(ExportError::Empty)?;
    Ok(build_document(snapshot, theme.colors(), bounds).to_string())
}

pub(crate) fn build_document(snapshot: &GraphSnapshot, colors: ThemeColors, bounds: Bounds) -> Document {
    let shift = |p: Point| p.offset(-bounds.x, -bounds.y);

    let background = Rectangle::new()
        .set("width", "100%")
        .set("height", "100%")
        .set("fill", colors.background);

    let positions: HashMap<&str, Point> = snapshot
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), shift(n.position)))
        .collect();

    let mut edges = Group::new().set("class", "edges").set("fill", "none");
    for edge in &snapshot.edges {
        let (Some(&from), Some(&to)) = (positions.get(edge.source.as_str()), positions.get(edge.target.as_str()))
        else {
            continue;
        };
        edges = edges.add(edge_path(edge, from, to, colors));
    }

    let mut nodes = Group::new().set("class", "nodes");
    for node in &snapshot.nodes {
        nodes = nodes.add(node_document(node, shift(node.position), colors));
    }

    Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set("width", bounds.width)
        .set("height", bounds.height)
        .set("viewBox", format!("0 0 {} {}", bounds.width, bounds.height))
        .add(background)
        .add(edges)
        .add(nodes)
}

/// Orthogonal connector from the bottom-center of `from` to the top-center
/// of `to`, bending at the vertical midpoint.
fn edge_path(edge: &PositionedEdge, from: Point, to: Point, colors: ThemeColors) -> Path {
    let (sx, sy) = (from.x + NODE_WIDTH / 2.0, from.y + NODE_HEIGHT);
    let (ex, ey) = (to.x + NODE_WIDTH / 2.0, to.y);
    let mid_y = (sy + ey) / 2.0;
    let stroke = if edge.selected { colors.accent } else { edge.style.stroke.as_str() };

    Path::new()
        .set("id", edge.id.as_str())
        .set("d", format!("M {sx} {sy} L {sx} {mid_y} L {ex} {mid_y} L {ex} {ey}"))
        .set("stroke", stroke)
        .set("stroke-width", edge.style.stroke_width)
}

/// One node as a nested `<svg>` viewport so its children use local
/// coordinates.
fn node_document(node: &PositionedNode, origin: Point, colors: ThemeColors) -> Document {
    let fill = node.data.color.as_deref().unwrap_or(colors.node_background);
    let border = if node.selected { colors.accent } else { colors.node_border };

    let inset = BORDER_WIDTH / 2.0;
    let frame = Rectangle::new()
        .set("x", inset)
        .set("y", inset)
        .set("width", NODE_WIDTH - BORDER_WIDTH)
        .set("height", NODE_HEIGHT - BORDER_WIDTH)
        .set("rx", CORNER_RADIUS)
        .set("fill", fill)
        .set("stroke", border)
        .set("stroke-width", BORDER_WIDTH);

    let mut doc = Document::new()
        .set("x", origin.x)
        .set("y", origin.y)
        .set("width", NODE_WIDTH)
        .set("height", NODE_HEIGHT)
        .add(frame);

    let mut label_y = NODE_HEIGHT / 2.0;
    if let Some(href) = node.data.image.as_deref() {
        doc = doc.add(
            Image::new()
                .set("href", href)
                .set("x", 0)
                .set("y", 4)
                .set("width", NODE_WIDTH)
                .set("height", IMAGE_HEIGHT)
                .set("preserveAspectRatio", "xMidYMid meet"),
        );
        label_y = IMAGE_HEIGHT + (NODE_HEIGHT - IMAGE_HEIGHT) / 2.0;
    }

    let label = Text::new(node.data.label.as_str())
        .set("x", NODE_WIDTH / 2.0)
        .set("y", label_y)
        .set("text-anchor", "middle")
        .set("dominant-baseline", "middle")
        .set("font-family", FONT_FAMILY)
        .set("font-size", FONT_SIZE)
        .set("fill", colors.node_text);

    doc.add(label)
}

#[cfg(test)]
#[path = "svg_test.rs"]
mod tests;
