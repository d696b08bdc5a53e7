//! Layout engine: maps an ungrounded diagram to world-space node positions.
//!
//! Three strategies, selected by [`DiagramKind`]:
//!
//! | Kind | Strategy |
//! |------|----------|
//! | `timeline` | single row, input order |
//! | `org_chart`, `decision_tree` | BFS levels, each row centered on x = 0 |
//! | `flowchart`, `architecture` | depth-first vertical flow at x = 0 |
//!
//! Every strategy is deterministic: the same nodes and edges in the same order
//! always produce the same positions. Edges that reference an unknown node are
//! left out of the adjacency structure, and a visited set guarantees each node
//! is placed exactly once even when the graph has cycles.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::collections::{HashMap, HashSet, VecDeque};

use crate::consts::{HORIZONTAL_SPACING, NODE_HEIGHT, NODE_WIDTH, TIMELINE_Y, VERTICAL_SPACING};
use crate::doc::{GraphSnapshot, PositionedEdge, PositionedNode, edge_id};
use crate::geometry::Point;
use crate::model::{DiagramData, DiagramEdge, DiagramKind, DiagramNode};

/// Horizontal distance between neighbouring node origins in a row.
pub const COLUMN_STEP: f64 = NODE_WIDTH + HORIZONTAL_SPACING;

/// Vertical distance between neighbouring levels or flow slots.
pub const ROW_STEP: f64 = NODE_HEIGHT + VERTICAL_SPACING;

// =============================================================================
// ADJACENCY
// =============================================================================

/// Directed adjacency built from the edges whose endpoints both exist.
///
/// Children keep edge order. Each node records a single parent; when a node
/// has several incoming edges the last one wins. The parent record is only
/// used to decide which nodes are roots.
#[derive(Debug, Default)]
pub struct Adjacency<'a> {
    children: HashMap<&'a str, Vec<&'a str>>,
    parent: HashMap<&'a str, &'a str>,
}

impl<'a> Adjacency<'a> {
    #[must_use]
    pub fn build(nodes: &'a [DiagramNode], edges: &'a [DiagramEdge]) -> Self {
        let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let mut adjacency = Self::default();
        for edge in edges {
            let (from, to) = (edge.from.as_str(), edge.to.as_str());
            if !known.contains(from) || !known.contains(to) {
                continue;
            }
            adjacency.children.entry(from).or_default().push(to);
            adjacency.parent.insert(to, from);
        }
        adjacency
    }

    /// Children of `id` in edge order.
    #[must_use]
    pub fn children(&self, id: &str) -> &[&'a str] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Recorded parent of `id` (last incoming edge).
    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&'a str> {
        self.parent.get(id).copied()
    }

    /// Nodes with no recorded parent, in input order.
    #[must_use]
    pub fn roots(&self, nodes: &'a [DiagramNode]) -> Vec<&'a str> {
        nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !self.parent.contains_key(id))
            .collect()
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Position every node of a diagram according to its kind.
#[must_use]
pub fn layout(nodes: &[DiagramNode], edges: &[DiagramEdge], kind: DiagramKind) -> Vec<PositionedNode> {
    match kind {
        DiagramKind::Timeline => layout_timeline(nodes),
        DiagramKind::OrgChart | DiagramKind::DecisionTree => layout_layered(nodes, edges),
        DiagramKind::Flowchart | DiagramKind::Architecture => layout_flow(nodes, edges),
    }
}

/// Convert ungrounded edges into presentation edges with the default style.
///
/// The id of the `i`-th edge is `edge-{from}-{to}-{i}`. Node positions are
/// not consulted.
#[must_use]
pub fn convert_edges(edges: &[DiagramEdge]) -> Vec<PositionedEdge> {
    edges
        .iter()
        .enumerate()
        .map(|(index, e)| PositionedEdge::new(edge_id(&e.from, &e.to, index), e.from.clone(), e.to.clone()))
        .collect()
}

/// Lay out a full diagram into a fresh, unselected snapshot.
///
/// Edges with an endpoint outside the node set are dropped so the snapshot
/// never contains a dangling edge; surviving edges keep their ordinal ids.
#[must_use]
pub fn layout_diagram(data: &DiagramData) -> GraphSnapshot {
    let nodes = layout(&data.nodes, &data.edges, data.kind);
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = convert_edges(&data.edges)
        .into_iter()
        .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
        .collect();
    GraphSnapshot::new(nodes, edges)
}

// =============================================================================
// STRATEGIES
// =============================================================================

#[allow(clippy::cast_precision_loss)]
fn step(index: usize, size: f64) -> f64 {
    index as f64 * size
}

/// First node for each id; later duplicates are ignored.
fn index_nodes(nodes: &[DiagramNode]) -> HashMap<&str, &DiagramNode> {
    let mut by_id = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }
    by_id
}

fn layout_timeline(nodes: &[DiagramNode]) -> Vec<PositionedNode> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| PositionedNode::new(n.id.clone(), n.label.clone(), Point::new(step(i, COLUMN_STEP), TIMELINE_Y)))
        .collect()
}

fn layout_layered(nodes: &[DiagramNode], edges: &[DiagramEdge]) -> Vec<PositionedNode> {
    let by_id = index_nodes(nodes);
    let adjacency = Adjacency::build(nodes, edges);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut levels: Vec<Vec<&str>> = Vec::new();

    let roots = adjacency.roots(nodes);
    assign_levels(roots, &adjacency, &mut visited, &mut levels);

    // Pure cycles have no root; seed them one at a time in input order.
    for node in nodes {
        if !visited.contains(node.id.as_str()) {
            assign_levels(vec![node.id.as_str()], &adjacency, &mut visited, &mut levels);
        }
    }

    let mut positioned = Vec::with_capacity(by_id.len());
    for (level, ids) in levels.iter().enumerate() {
        let row_width = step(ids.len(), COLUMN_STEP);
        let start_x = -row_width / 2.0;
        let y = step(level, ROW_STEP);
        for (i, id) in ids.iter().enumerate() {
            if let Some(node) = by_id.get(id) {
                positioned.push(PositionedNode::new(node.id.clone(), node.label.clone(), Point::new(start_x + step(i, COLUMN_STEP), y)));
            }
        }
    }
    positioned
}

/// Breadth-first leveling from `seeds` (all at level 0). A node keeps the
/// level at which it is first dequeued.
fn assign_levels<'a>(
    seeds: Vec<&'a str>,
    adjacency: &Adjacency<'a>,
    visited: &mut HashSet<&'a str>,
    levels: &mut Vec<Vec<&'a str>>,
) {
    let mut queue: VecDeque<(&str, usize)> = seeds.into_iter().map(|id| (id, 0)).collect();
    while let Some((id, level)) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(id);
        for &child in adjacency.children(id) {
            if !visited.contains(child) {
                queue.push_back((child, level + 1));
            }
        }
    }
}

fn layout_flow(nodes: &[DiagramNode], edges: &[DiagramEdge]) -> Vec<PositionedNode> {
    let by_id = index_nodes(nodes);
    let adjacency = Adjacency::build(nodes, edges);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut positioned = Vec::with_capacity(by_id.len());

    let starts = adjacency
        .roots(nodes)
        .into_iter()
        .chain(nodes.iter().map(|n| n.id.as_str()));
    for start in starts {
        if visited.contains(start) {
            continue;
        }
        // Pre-order DFS; children pushed in reverse so the first child is visited first.
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = by_id.get(id) else {
                continue;
            };
            let y = step(positioned.len(), ROW_STEP);
            positioned.push(PositionedNode::new(node.id.clone(), node.label.clone(), Point::new(0.0, y)));
            for &child in adjacency.children(id).iter().rev() {
                if !visited.contains(child) {
                    stack.push(child);
                }
            }
        }
    }
    positioned
}
