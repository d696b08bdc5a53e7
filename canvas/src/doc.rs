//! Document model: positioned nodes and edges, and the snapshot that holds them.
//!
//! This module defines what is on the canvas once a diagram has been laid out
//! (`PositionedNode`, `PositionedEdge`), the per-node presentation bag
//! (`NodeData`), and the immutable unit of undo/redo (`GraphSnapshot`).
//!
//! Snapshots are produced by the layout engine and by mutation operations in
//! [`crate::ops`]; they are never edited in place once recorded in the
//! [`crate::history::HistoryLedger`]. The serialized shape matches what the
//! rendering substrate and the JSON export expect (`type`, `position`,
//! `data`, `source`/`target`).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_EDGE_STROKE, DEFAULT_EDGE_STROKE_WIDTH, DEFAULT_EDGE_TYPE, DEFAULT_NODE_TYPE};
use crate::geometry::Point;
use crate::model::NodeId;

/// Free-form presentation data carried by a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Display text.
    pub label: String,
    /// Image reference (URL or data URI) shown above the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Background color override as a CSS color string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NodeData {
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self { label: label.into(), image: None, color: None }
    }
}

/// A node with a world-space position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: NodeId,
    /// Top-left corner of the node in world coordinates.
    pub position: Point,
    pub data: NodeData,
    #[serde(default)]
    pub selected: bool,
    /// Type tag consumed only by the rendering substrate.
    #[serde(rename = "type")]
    pub node_type: String,
}

impl PositionedNode {
    /// Unselected default-typed node.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            data: NodeData::labeled(label),
            selected: false,
            node_type: DEFAULT_NODE_TYPE.to_owned(),
        }
    }
}

/// Stroke styling for an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self { stroke: DEFAULT_EDGE_STROKE.to_owned(), stroke_width: DEFAULT_EDGE_STROKE_WIDTH }
    }
}

/// A directed edge between two positioned nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedEdge {
    /// Synthetic identity; disambiguates parallel edges.
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub selected: bool,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub animated: bool,
    pub style: EdgeStyle,
}

impl PositionedEdge {
    /// Unselected edge with the default style.
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            selected: false,
            edge_type: DEFAULT_EDGE_TYPE.to_owned(),
            animated: false,
            style: EdgeStyle::default(),
        }
    }

    /// Whether either endpoint is `node_id`.
    #[must_use]
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Synthetic edge id for the `index`-th edge between `from` and `to`.
#[must_use]
pub fn edge_id(from: &str, to: &str, index: usize) -> String {
    format!("edge-{from}-{to}-{index}")
}

/// A complete positioned graph state; the unit of undo/redo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
}

impl GraphSnapshot {
    #[must_use]
    pub fn new(nodes: Vec<PositionedNode>, edges: Vec<PositionedEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&PositionedEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// All node ids currently present.
    #[must_use]
    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Selected nodes, in document order.
    pub fn selected_nodes(&self) -> impl Iterator<Item = &PositionedNode> {
        self.nodes.iter().filter(|n| n.selected)
    }

    /// Selected edges, in document order.
    pub fn selected_edges(&self) -> impl Iterator<Item = &PositionedEdge> {
        self.edges.iter().filter(|e| e.selected)
    }

    /// Whether any node or edge is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.nodes.iter().any(|n| n.selected) || self.edges.iter().any(|e| e.selected)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the snapshot has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
