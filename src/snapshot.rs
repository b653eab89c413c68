//! Immutable graph snapshot
//!
//! A [`GraphSnapshot`] is built once per feed fetch and never mutated
//! afterwards. Positions, velocities and pins are layout state and live in
//! [`LayoutState`](crate::layout::LayoutState), index-aligned with
//! `snapshot.nodes()`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::dedup::{DroppedEdge, EdgeDeduplicator};
use crate::feed::FeedPayload;

/// Identifier of a content item
pub type NodeId = u64;

/// Degree tier used for node coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeTier {
    /// More than two incident edges
    High,
    /// Exactly two incident edges
    Medium,
    /// One or no incident edges
    Low,
}

impl DegreeTier {
    pub fn of(degree: usize) -> Self {
        match degree {
            0 | 1 => DegreeTier::Low,
            2 => DegreeTier::Medium,
            _ => DegreeTier::High,
        }
    }
}

/// A content item in the snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    /// Number of deduplicated edges incident to this node
    pub degree: usize,
}

impl Node {
    pub fn tier(&self) -> DegreeTier {
        DegreeTier::of(self.degree)
    }
}

/// An undirected edge, stored with `a < b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Similarity in [0, 1]
    pub strength: f32,
}

impl Edge {
    /// Create an edge, normalizing the endpoint order
    pub fn new(x: NodeId, y: NodeId, strength: f32) -> Self {
        Self {
            a: x.min(y),
            b: x.max(y),
            strength,
        }
    }

    /// The unordered pair key
    pub fn key(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.a == id || self.b == id
    }
}

/// Metrics readout for the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
}

impl GraphMetrics {
    pub fn new(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            edge_count,
            density: density(node_count, edge_count),
        }
    }
}

/// Ratio of actual to possible edges in a simple undirected graph
pub fn density(node_count: usize, edge_count: usize) -> f64 {
    if node_count <= 1 {
        return 0.0;
    }
    let n = node_count as f64;
    2.0 * edge_count as f64 / (n * (n - 1.0))
}

/// Diagnostics collected while building a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotReport {
    /// Candidate records that did not become edges
    pub dropped_edges: Vec<DroppedEdge>,
    /// Node ids that appeared more than once (later copies ignored)
    pub duplicate_nodes: Vec<NodeId>,
}

/// One immutable node + edge data set
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<NodeId, usize>,
    /// `edges` resolved to node positions, built once
    edge_index: Vec<(usize, usize, f32)>,
}

impl GraphSnapshot {
    /// Build a snapshot from a feed payload
    pub fn from_feed(payload: &FeedPayload) -> (Self, SnapshotReport) {
        let mut report = SnapshotReport::default();
        let mut nodes = Vec::with_capacity(payload.nodes.len());
        let mut ids = HashSet::with_capacity(payload.nodes.len());

        for node in &payload.nodes {
            if !ids.insert(node.id) {
                warn!(id = node.id, "duplicate node id in feed, keeping first");
                report.duplicate_nodes.push(node.id);
                continue;
            }
            nodes.push(Node {
                id: node.id,
                title: node.title.clone(),
                degree: 0,
            });
        }

        let outcome = EdgeDeduplicator::new(&ids).dedup(&payload.edges);
        report.dropped_edges = outcome.dropped;

        let snapshot = Self::from_parts(nodes, outcome.edges);
        debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            dropped = report.dropped_edges.len(),
            "built graph snapshot"
        );
        (snapshot, report)
    }

    /// Assemble a snapshot from already-valid parts, recomputing degrees
    fn from_parts(mut nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let index: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        for node in &mut nodes {
            node.degree = 0;
        }
        for edge in &edges {
            for id in [edge.a, edge.b] {
                if let Some(&i) = index.get(&id) {
                    nodes[i].degree += 1;
                }
            }
        }

        let edge_index = edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.a)?, *index.get(&e.b)?, e.strength)))
            .collect();

        Self {
            nodes,
            edges,
            index,
            edge_index,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of a node id in `nodes()`
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Edges as `(index_a, index_b, strength)` triples
    pub fn edge_indices(&self) -> &[(usize, usize, f32)] {
        &self.edge_index
    }

    pub fn metrics(&self) -> GraphMetrics {
        GraphMetrics::new(self.nodes.len(), self.edges.len())
    }
}
