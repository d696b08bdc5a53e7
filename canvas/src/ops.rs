//! Mutation operations over a [`GraphSnapshot`].
//!
//! Every operation borrows the current snapshot and returns a new one; the
//! caller decides whether to record it. Operations never leave a dangling
//! edge behind and never fail on an unknown node id, except [`connect`],
//! which refuses to create an edge to nowhere.

#[cfg(test)]
#[path = "ops_test.rs"]
mod ops_test;

use std::collections::HashSet;

use crate::consts::{DEFAULT_NODE_LABEL, PASTE_OFFSET};
use crate::doc::{GraphSnapshot, PositionedEdge, PositionedNode, edge_id};
use crate::geometry::Point;
use crate::layout::layout_diagram;
use crate::model::{DiagramData, NodeId};

/// Failure of an operation that cannot be applied as requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
}

/// What a delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Removed {
    pub nodes: usize,
    pub edges: usize,
}

impl Removed {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.nodes == 0 && self.edges == 0
    }
}

// =============================================================================
// CREATE / DELETE
// =============================================================================

/// Append an unselected node. `label` defaults to `"New Node"`.
#[must_use]
pub fn add_node(snapshot: &GraphSnapshot, id: impl Into<NodeId>, label: Option<&str>, position: Point) -> GraphSnapshot {
    let mut next = snapshot.clone();
    next.nodes
        .push(PositionedNode::new(id, label.unwrap_or(DEFAULT_NODE_LABEL), position));
    next
}

/// Remove selected nodes, selected edges and every edge touching a removed node.
#[must_use]
pub fn delete_selected(snapshot: &GraphSnapshot) -> (GraphSnapshot, Removed) {
    let doomed: HashSet<&str> = snapshot.selected_nodes().map(|n| n.id.as_str()).collect();
    remove(snapshot, &doomed, true)
}

/// Remove one node and every edge touching it.
#[must_use]
pub fn delete_node(snapshot: &GraphSnapshot, id: &str) -> (GraphSnapshot, Removed) {
    let doomed: HashSet<&str> = snapshot.node(id).map(|n| n.id.as_str()).into_iter().collect();
    remove(snapshot, &doomed, false)
}

fn remove(snapshot: &GraphSnapshot, doomed: &HashSet<&str>, drop_selected_edges: bool) -> (GraphSnapshot, Removed) {
    let nodes: Vec<PositionedNode> = snapshot
        .nodes
        .iter()
        .filter(|n| !doomed.contains(n.id.as_str()))
        .cloned()
        .collect();
    let edges: Vec<PositionedEdge> = snapshot
        .edges
        .iter()
        .filter(|e| !(drop_selected_edges && e.selected))
        .filter(|e| !doomed.contains(e.source.as_str()) && !doomed.contains(e.target.as_str()))
        .cloned()
        .collect();
    let removed = Removed {
        nodes: snapshot.nodes.len() - nodes.len(),
        edges: snapshot.edges.len() - edges.len(),
    };
    (GraphSnapshot::new(nodes, edges), removed)
}

/// Append a default-styled edge from `from` to `to`.
///
/// Parallel edges and self-edges are allowed. The id takes the smallest
/// ordinal that is not already used in the snapshot.
///
/// # Errors
///
/// Returns [`EditError::UnknownNode`] if either endpoint is not in the snapshot.
pub fn connect(snapshot: &GraphSnapshot, from: &str, to: &str) -> Result<GraphSnapshot, EditError> {
    for id in [from, to] {
        if !snapshot.contains_node(id) {
            return Err(EditError::UnknownNode(id.to_owned()));
        }
    }
    let taken: HashSet<&str> = snapshot.edges.iter().map(|e| e.id.as_str()).collect();
    let id = (0..)
        .map(|n| edge_id(from, to, n))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| edge_id(from, to, snapshot.edges.len()));
    let mut next = snapshot.clone();
    next.edges.push(PositionedEdge::new(id, from, to));
    Ok(next)
}

// =============================================================================
// NODE EDITS
// =============================================================================

fn edit_node(snapshot: &GraphSnapshot, id: &str, apply: impl FnOnce(&mut PositionedNode)) -> GraphSnapshot {
    let mut next = snapshot.clone();
    if let Some(node) = next.nodes.iter_mut().find(|n| n.id == id) {
        apply(node);
    }
    next
}

/// Set a node's background color.
#[must_use]
pub fn recolor(snapshot: &GraphSnapshot, id: &str, color: &str) -> GraphSnapshot {
    edit_node(snapshot, id, |n| n.data.color = Some(color.to_owned()))
}

/// Attach an image reference (URL or data URI) to a node.
#[must_use]
pub fn attach_image(snapshot: &GraphSnapshot, id: &str, image: &str) -> GraphSnapshot {
    edit_node(snapshot, id, |n| n.data.image = Some(image.to_owned()))
}

#[must_use]
pub fn relabel(snapshot: &GraphSnapshot, id: &str, label: &str) -> GraphSnapshot {
    edit_node(snapshot, id, |n| label.clone_into(&mut n.data.label))
}

/// Move a node's top-left corner to `position`.
#[must_use]
pub fn move_node(snapshot: &GraphSnapshot, id: &str, position: Point) -> GraphSnapshot {
    edit_node(snapshot, id, |n| n.position = position)
}

// =============================================================================
// SELECTION
// =============================================================================

fn set_all(snapshot: &GraphSnapshot, selected: bool) -> GraphSnapshot {
    let mut next = snapshot.clone();
    next.nodes.iter_mut().for_each(|n| n.selected = selected);
    next.edges.iter_mut().for_each(|e| e.selected = selected);
    next
}

#[must_use]
pub fn select_all(snapshot: &GraphSnapshot) -> GraphSnapshot {
    set_all(snapshot, true)
}

#[must_use]
pub fn deselect_all(snapshot: &GraphSnapshot) -> GraphSnapshot {
    set_all(snapshot, false)
}

/// Click on a node. Additive clicks flip that node only; plain clicks make it
/// the sole selection.
#[must_use]
pub fn toggle_node_selection(snapshot: &GraphSnapshot, id: &str, additive: bool) -> GraphSnapshot {
    if !snapshot.contains_node(id) {
        return snapshot.clone();
    }
    let mut next = if additive { snapshot.clone() } else { deselect_all(snapshot) };
    for node in next.nodes.iter_mut().filter(|n| n.id == id) {
        node.selected = if additive { !node.selected } else { true };
    }
    next
}

/// Click on an edge; same rules as [`toggle_node_selection`].
#[must_use]
pub fn toggle_edge_selection(snapshot: &GraphSnapshot, id: &str, additive: bool) -> GraphSnapshot {
    if snapshot.edge(id).is_none() {
        return snapshot.clone();
    }
    let mut next = if additive { snapshot.clone() } else { deselect_all(snapshot) };
    for edge in next.edges.iter_mut().filter(|e| e.id == id) {
        edge.selected = if additive { !edge.selected } else { true };
    }
    next
}

// =============================================================================
// CLIPBOARD
// =============================================================================

/// Nodes most recently copied. Independent of history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    nodes: Vec<PositionedNode>,
}

impl Clipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with the selected nodes of `snapshot`.
    ///
    /// Leaves the clipboard untouched and returns 0 when nothing is selected.
    pub fn copy_selection(&mut self, snapshot: &GraphSnapshot) -> usize {
        let selected: Vec<PositionedNode> = snapshot.selected_nodes().cloned().collect();
        if selected.is_empty() {
            return 0;
        }
        self.nodes = selected;
        self.nodes.len()
    }

    #[must_use]
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Append a copy of every clipboard node, offset by (50, 50) and unselected.
///
/// `fresh_id` receives the original id and must return an id that is unused
/// in `snapshot` and unique among the pasted copies. Edges are not copied.
#[must_use]
pub fn paste(snapshot: &GraphSnapshot, clipboard: &Clipboard, mut fresh_id: impl FnMut(&str) -> NodeId) -> GraphSnapshot {
    let mut next = snapshot.clone();
    for original in clipboard.nodes() {
        let mut copy = original.clone();
        copy.id = fresh_id(&original.id);
        copy.position = original.position.offset(PASTE_OFFSET, PASTE_OFFSET);
        copy.selected = false;
        next.nodes.push(copy);
    }
    next
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Re-derive every position from the diagram description.
///
/// Selection, colors, images, labels and manually added nodes are discarded.
#[must_use]
pub fn reset_layout(data: &DiagramData) -> GraphSnapshot {
    layout_diagram(data)
}
