//! Ungrounded diagram description: kind, nodes and edges without positions.
//!
//! This is the contract surface with the generation adapters. A `DiagramData`
//! is produced once per generation request and handed straight to the layout
//! engine; nothing in this module knows about coordinates or selection.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one diagram.
pub type NodeId = String;

/// The kind of diagram. Selects the layout strategy and default presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    /// Top-down process flow.
    Flowchart,
    /// Reporting hierarchy.
    OrgChart,
    /// Branching decisions.
    DecisionTree,
    /// Left-to-right sequence of events.
    Timeline,
    /// Components and their dependencies.
    Architecture,
}

impl DiagramKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [Self::Flowchart, Self::OrgChart, Self::DecisionTree, Self::Timeline, Self::Architecture];

    /// Wire name (`"org_chart"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::OrgChart => "org_chart",
            Self::DecisionTree => "decision_tree",
            Self::Timeline => "timeline",
            Self::Architecture => "architecture",
        }
    }

    /// Human-readable title (`"ORG CHART"`), as shown in the editor header.
    #[must_use]
    pub fn title(self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known diagram kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagram kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for DiagramKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

/// A node in the ungrounded description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: NodeId,
    pub label: String,
}

impl DiagramNode {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into() }
    }
}

/// A directed edge. Cycles and parallel edges are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub from: NodeId,
    pub to: NodeId,
}

impl DiagramEdge {
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self { from: from.into(), to: to.into() }
    }
}

/// Position-free diagram description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramData {
    /// Diagram kind. Serialized as `type`; `kind` is accepted on input.
    #[serde(rename = "type", alias = "kind")]
    pub kind: DiagramKind,
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl DiagramData {
    #[must_use]
    pub fn new(kind: DiagramKind, nodes: Vec<DiagramNode>, edges: Vec<DiagramEdge>) -> Self {
        Self { kind, nodes, edges }
    }

    /// Whether `id` names a node of this diagram.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Edges with an endpoint that is not in the node set.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &DiagramEdge> {
        self.edges
            .iter()
            .filter(|e| !self.contains_node(&e.from) || !self.contains_node(&e.to))
    }
}
