//! Graph data feed
//!
//! The feed is the payload handed over by the external data collaborator:
//! plain node and relationship records, possibly directed, duplicated or
//! dangling. Nothing here enforces graph invariants; that happens when a
//! [`GraphSnapshot`](crate::snapshot::GraphSnapshot) is built from it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::snapshot::NodeId;

/// A content item in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedNode {
    pub id: NodeId,
    pub title: String,
}

/// A candidate relationship between two content items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Semantic similarity, expected in [0, 1]
    pub similarity: f32,
}

/// Complete feed payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    pub nodes: Vec<FeedNode>,
    #[serde(default)]
    pub edges: Vec<FeedEdge>,
}

impl FeedPayload {
    /// Parse a payload from JSON text
    pub fn from_json_str(content: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a payload from a JSON file
    pub fn from_json_file(path: &Path) -> GraphResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Bounds of the batched query that produced a feed
///
/// Feeds coming from a live source are already bounded; applying the same
/// bounds locally keeps file-based feeds comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedBounds {
    /// Maximum number of nodes kept (in feed order)
    pub max_nodes: usize,
    /// Maximum number of edges kept per node, counting both endpoints
    /// (strongest first)
    pub max_edges_per_node: usize,
    /// Edges below this similarity are discarded
    pub min_similarity: f32,
}

impl Default for FeedBounds {
    fn default() -> Self {
        Self {
            max_nodes: 100,
            max_edges_per_node: 5,
            min_similarity: 0.5,
        }
    }
}

impl FeedBounds {
    /// Apply the bounds, returning the reduced payload
    ///
    /// Edges touching a node cut by `max_nodes` are removed here. Edges the
    /// snapshot will reject anyway (self-loops, unknown ids, invalid
    /// similarity) pass through untouched so they are reported there. The
    /// per-node cap counts every kept edge against both of its endpoints,
    /// strongest first. Surviving edges keep their feed order.
    pub fn apply(&self, payload: &FeedPayload) -> FeedPayload {
        let nodes: Vec<FeedNode> = payload.nodes.iter().take(self.max_nodes).cloned().collect();
        let kept_ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
        let cut_ids: HashSet<NodeId> = payload
            .nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !kept_ids.contains(id))
            .collect();

        let mut keep = vec![false; payload.edges.len()];
        let mut ranked = Vec::new();
        for (i, e) in payload.edges.iter().enumerate() {
            if cut_ids.contains(&e.source) || cut_ids.contains(&e.target) {
                continue;
            }
            // NaN similarities pass through; snapshot construction reports them
            if e.similarity < self.min_similarity {
                continue;
            }
            let rejected_later = e.source == e.target
                || !kept_ids.contains(&e.source)
                || !kept_ids.contains(&e.target)
                || !(0.0..=1.0).contains(&e.similarity);
            if rejected_later {
                keep[i] = true;
            } else {
                ranked.push(i);
            }
        }

        // Stable sort: equal similarities keep feed order
        ranked.sort_by(|&a, &b| {
            payload.edges[b]
                .similarity
                .total_cmp(&payload.edges[a].similarity)
        });

        let mut incident: HashMap<NodeId, usize> = HashMap::new();
        let mut decided: HashMap<(NodeId, NodeId), bool> = HashMap::new();
        for i in ranked {
            let e = &payload.edges[i];
            let pair = (e.source.min(e.target), e.source.max(e.target));
            // Repeated pairs follow the first decision and never count twice
            if let Some(&accepted) = decided.get(&pair) {
                keep[i] = accepted;
                continue;
            }
            let room =
                |id: &NodeId| incident.get(id).copied().unwrap_or(0) < self.max_edges_per_node;
            let accepted = room(&e.source) && room(&e.target);
            if accepted {
                *incident.entry(e.source).or_default() += 1;
                *incident.entry(e.target).or_default() += 1;
            }
            decided.insert(pair, accepted);
            keep[i] = accepted;
        }

        let edges = payload
            .edges
            .iter()
            .enumerate()
            .filter(|(i, _)| keep[*i])
            .map(|(_, e)| e.clone())
            .collect();

        FeedPayload { nodes, edges }
    }
}

/// An asynchronous provider of feed payloads
pub trait FeedSource {
    /// Fetch the current payload
    fn fetch(&self) -> impl Future<Output = GraphResult<FeedPayload>> + Send;
}

/// Feed read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for FileFeed {
    fn fetch(&self) -> impl Future<Output = GraphResult<FeedPayload>> + Send {
        let path = self.path.clone();
        async move {
            let content = tokio::fs::read_to_string(&path).await?;
            FeedPayload::from_json_str(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId) -> FeedNode {
        FeedNode {
            id,
            title: format!("Article {id}"),
        }
    }

    fn edge(source: NodeId, target: NodeId, similarity: f32) -> FeedEdge {
        FeedEdge {
            source,
            target,
            similarity,
        }
    }

    #[test]
    fn parses_payload_json() {
        let json = r#"{
            "nodes": [{"id": 1, "title": "Quantum"}, {"id": 2, "title": "Climate"}],
            "edges": [{"source": 1, "target": 2, "similarity": 0.8}]
        }"#;
        let payload = FeedPayload::from_json_str(json).unwrap();

        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.nodes[0].title, "Quantum");
        assert_eq!(payload.edges, vec![edge(1, 2, 0.8)]);
    }

    #[test]
    fn edges_are_optional_in_json() {
        let payload = FeedPayload::from_json_str(r#"{"nodes": []}"#).unwrap();
        assert!(payload.edges.is_empty());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = FeedPayload::from_json_str("{\"nodes\": [").unwrap_err();
        assert!(matches!(err, crate::error::GraphError::Parse(_)));
    }

    #[test]
    fn bounds_truncate_nodes_and_their_edges() {
        let payload = FeedPayload {
            nodes: (1..=4).map(node).collect(),
            edges: vec![edge(1, 2, 0.9), edge(3, 4, 0.9), edge(1, 4, 0.9)],
        };
        let bounds = FeedBounds {
            max_nodes: 3,
            ..Default::default()
        };

        let bounded = bounds.apply(&payload);

        assert_eq!(bounded.nodes.len(), 3);
        assert_eq!(bounded.edges, vec![edge(1, 2, 0.9)]);
    }

    #[test]
    fn bounds_drop_weak_edges() {
        let payload = FeedPayload {
            nodes: (1..=3).map(node).collect(),
            edges: vec![edge(1, 2, 0.49), edge(2, 3, 0.5)],
        };

        let bounded = FeedBounds::default().apply(&payload);

        assert_eq!(bounded.edges, vec![edge(2, 3, 0.5)]);
    }

    #[test]
    fn bounds_keep_unknown_ids_for_the_snapshot_to_report() {
        let payload = FeedPayload {
            nodes: (1..=3).map(node).collect(),
            edges: vec![
                edge(1, 42, 0.9),
                edge(2, 2, 0.9),
                edge(1, 3, f32::NAN),
                edge(1, 2, 0.9),
            ],
        };
        let bounds = FeedBounds {
            max_nodes: 2,
            ..Default::default()
        };

        let bounded = bounds.apply(&payload);

        // 1 -> 3 touches a node cut by max_nodes and is the only edge removed
        assert_eq!(bounded.edges.len(), 3);
        assert_eq!(bounded.edges[0], edge(1, 42, 0.9));
        assert_eq!(bounded.edges[1], edge(2, 2, 0.9));
        assert_eq!(bounded.edges[2], edge(1, 2, 0.9));
    }

    #[test]
    fn bounds_cap_counts_edges_where_node_is_target() {
        let payload = FeedPayload {
            nodes: (1..=5).map(node).collect(),
            edges: vec![
                edge(5, 1, 0.6),
                edge(2, 1, 0.9),
                edge(4, 1, 0.7),
                edge(3, 1, 0.8),
            ],
        };
        let bounds = FeedBounds {
            max_edges_per_node: 2,
            ..Default::default()
        };

        let bounded = bounds.apply(&payload);

        assert_eq!(bounded.edges, vec![edge(2, 1, 0.9), edge(3, 1, 0.8)]);
    }

    #[test]
    fn bounds_count_a_repeated_pair_once() {
        let payload = FeedPayload {
            nodes: (1..=3).map(node).collect(),
            edges: vec![edge(1, 2, 0.9), edge(2, 1, 0.9), edge(1, 3, 0.8)],
        };
        let bounds = FeedBounds {
            max_edges_per_node: 2,
            ..Default::default()
        };

        let bounded = bounds.apply(&payload);

        // The reverse record survives for the deduplicator to report
        assert_eq!(bounded.edges.len(), 3);
    }

    #[test]
    fn bounds_keep_strongest_edges_per_node_in_feed_order() {
        let payload = FeedPayload {
            nodes: (1..=5).map(node).collect(),
            edges: vec![
                edge(1, 2, 0.6),
                edge(1, 3, 0.9),
                edge(1, 4, 0.7),
                edge(1, 5, 0.8),
                edge(2, 3, 0.55),
            ],
        };
        let bounds = FeedBounds {
            max_edges_per_node: 2,
            ..Default::default()
        };

        let bounded = bounds.apply(&payload);

        assert_eq!(
            bounded.edges,
            vec![edge(1, 3, 0.9), edge(1, 5, 0.8), edge(2, 3, 0.55)]
        );
    }

    #[tokio::test]
    async fn file_feed_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, r#"{"nodes": [{"id": 7, "title": "Solo"}], "edges": []}"#).unwrap();

        let payload = FileFeed::new(&path).fetch().await.unwrap();

        assert_eq!(payload.nodes, vec![FeedNode { id: 7, title: "Solo".into() }]);
    }

    #[tokio::test]
    async fn file_feed_missing_file_is_io_error() {
        let feed = FileFeed::new("does/not/exist.json");
        let err = feed.fetch().await.unwrap_err();
        assert!(matches!(err, crate::error::GraphError::Io(_)));
    }
}
