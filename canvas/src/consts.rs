//! Shared numeric constants for the canvas crate.

// ── Node geometry ───────────────────────────────────────────────

/// Width of a laid-out node in world units.
pub const NODE_WIDTH: f64 = 180.0;

/// Height of a laid-out node in world units.
pub const NODE_HEIGHT: f64 = 60.0;

/// Horizontal gutter between neighbouring nodes in a row.
pub const HORIZONTAL_SPACING: f64 = 100.0;

/// Vertical gutter between neighbouring rows or flow slots.
pub const VERTICAL_SPACING: f64 = 120.0;

/// Fixed y coordinate of the timeline row.
pub const TIMELINE_Y: f64 = 100.0;

// ── Editing ─────────────────────────────────────────────────────

/// Maximum number of snapshots retained by the history ledger.
pub const HISTORY_CAPACITY: usize = 50;

/// Offset applied to pasted nodes relative to their originals, on both axes.
pub const PASTE_OFFSET: f64 = 50.0;

/// New nodes land at a random position in `[0, ADD_NODE_SPREAD)` on both axes.
pub const ADD_NODE_SPREAD: f64 = 400.0;

/// Label given to nodes created without an explicit label.
pub const DEFAULT_NODE_LABEL: &str = "New Node";

/// Render-substrate type tag carried by every node.
pub const DEFAULT_NODE_TYPE: &str = "default";

// ── Edge presentation ───────────────────────────────────────────

/// Render-substrate type tag carried by every edge.
pub const DEFAULT_EDGE_TYPE: &str = "smoothstep";

/// Default edge stroke color.
pub const DEFAULT_EDGE_STROKE: &str = "black";

/// Default edge stroke width.
pub const DEFAULT_EDGE_STROKE_WIDTH: f64 = 2.0;

// ── Node menu ───────────────────────────────────────────────────

/// Swatches offered by the per-node color picker.
pub const NODE_COLOR_PALETTE: [&str; 10] = [
    "#ffffff", "#f3f4f6", "#dbeafe", "#fef3c7", "#fecaca", "#d1fae5", "#e9d5ff", "#fed7aa", "#fce7f3", "#e0e7ff",
];
