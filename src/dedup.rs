//! Edge deduplication
//!
//! Turns the candidate relationship records of a feed into a simple
//! undirected edge set. Two records for the same pair in either direction
//! collapse into one edge; the first record encountered wins and later ones
//! are discarded without merging their similarity.

use std::collections::HashSet;

use tracing::warn;

use crate::feed::FeedEdge;
use crate::snapshot::{Edge, NodeId};

/// Why a candidate record did not become an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropReason {
    /// `source == target`
    SelfLoop,
    /// An endpoint is not in the node set
    UnknownNode(NodeId),
    /// Similarity is NaN, infinite, or outside [0, 1]
    InvalidStrength(f32),
    /// The unordered pair was already seen
    Duplicate,
}

/// A candidate record that was discarded
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedEdge {
    pub record: FeedEdge,
    pub reason: DropReason,
}

/// Result of deduplicating a candidate list
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Surviving edges in first-encounter order
    pub edges: Vec<Edge>,
    /// Every discarded record with its reason
    pub dropped: Vec<DroppedEdge>,
}

/// Normalizes candidate relationship records against a node set
pub struct EdgeDeduplicator<'a> {
    node_ids: &'a HashSet<NodeId>,
}

impl<'a> EdgeDeduplicator<'a> {
    pub fn new(node_ids: &'a HashSet<NodeId>) -> Self {
        Self { node_ids }
    }

    /// Deduplicate `candidates` into a simple undirected edge set
    pub fn dedup(&self, candidates: &[FeedEdge]) -> DedupOutcome {
        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::with_capacity(candidates.len());
        let mut outcome = DedupOutcome::default();

        for record in candidates {
            match self.check(record, &seen) {
                Ok(edge) => {
                    seen.insert(edge.key());
                    outcome.edges.push(edge);
                }
                Err(reason) => {
                    if reason != DropReason::Duplicate {
                        warn!(
                            source = record.source,
                            target = record.target,
                            ?reason,
                            "dropping relationship record"
                        );
                    }
                    outcome.dropped.push(DroppedEdge {
                        record: record.clone(),
                        reason,
                    });
                }
            }
        }

        outcome
    }

    fn check(
        &self,
        record: &FeedEdge,
        seen: &HashSet<(NodeId, NodeId)>,
    ) -> Result<Edge, DropReason> {
        if record.source == record.target {
            return Err(DropReason::SelfLoop);
        }
        for id in [record.source, record.target] {
            if !self.node_ids.contains(&id) {
                return Err(DropReason::UnknownNode(id));
            }
        }
        let strength = record.similarity;
        if !strength.is_finite() || !(0.0..=1.0).contains(&strength) {
            return Err(DropReason::InvalidStrength(strength));
        }
        let edge = Edge::new(record.source, record.target, strength);
        if seen.contains(&edge.key()) {
            return Err(DropReason::Duplicate);
        }
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[NodeId]) -> HashSet<NodeId> {
        values.iter().copied().collect()
    }

    fn record(source: NodeId, target: NodeId, similarity: f32) -> FeedEdge {
        FeedEdge {
            source,
            target,
            similarity,
        }
    }

    #[test]
    fn reversed_duplicate_collapses() {
        let nodes = ids(&[1, 2, 3]);
        let outcome =
            EdgeDeduplicator::new(&nodes).dedup(&[record(1, 2, 0.8), record(2, 1, 0.8)]);

        assert_eq!(outcome.edges, vec![Edge::new(1, 2, 0.8)]);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].reason, DropReason::Duplicate);
    }

    #[test]
    fn first_encountered_strength_wins() {
        let nodes = ids(&[1, 2]);
        let outcome =
            EdgeDeduplicator::new(&nodes).dedup(&[record(2, 1, 0.6), record(1, 2, 0.95)]);

        assert_eq!(outcome.edges.len(), 1);
        assert_eq!(outcome.edges[0].strength, 0.6);
        assert_eq!(outcome.edges[0].key(), (1, 2));
    }

    #[test]
    fn self_loops_dropped() {
        let nodes = ids(&[1]);
        let outcome = EdgeDeduplicator::new(&nodes).dedup(&[record(1, 1, 0.9)]);

        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.dropped[0].reason, DropReason::SelfLoop);
    }

    #[test]
    fn unknown_endpoints_dropped() {
        let nodes = ids(&[1, 2]);
        let outcome =
            EdgeDeduplicator::new(&nodes).dedup(&[record(1, 42, 0.9), record(1, 2, 0.7)]);

        assert_eq!(outcome.edges, vec![Edge::new(1, 2, 0.7)]);
        assert_eq!(outcome.dropped[0].reason, DropReason::UnknownNode(42));
    }

    #[test]
    fn invalid_strengths_dropped() {
        let nodes = ids(&[1, 2, 3, 4]);
        let outcome = EdgeDeduplicator::new(&nodes).dedup(&[
            record(1, 2, f32::NAN),
            record(1, 3, 1.5),
            record(1, 4, -0.1),
            record(2, 3, f32::INFINITY),
        ]);

        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.dropped.len(), 4);
        assert!(
            outcome
                .dropped
                .iter()
                .all(|d| matches!(d.reason, DropReason::InvalidStrength(_)))
        );
    }

    #[test]
    fn invalid_first_record_does_not_block_valid_duplicate() {
        let nodes = ids(&[1, 2]);
        let outcome =
            EdgeDeduplicator::new(&nodes).dedup(&[record(1, 2, 2.0), record(2, 1, 0.7)]);

        assert_eq!(outcome.edges, vec![Edge::new(1, 2, 0.7)]);
    }

    #[test]
    fn boundary_strengths_accepted() {
        let nodes = ids(&[1, 2, 3]);
        let outcome =
            EdgeDeduplicator::new(&nodes).dedup(&[record(1, 2, 0.0), record(2, 3, 1.0)]);

        assert_eq!(outcome.edges.len(), 2);
    }

    #[test]
    fn output_is_simple_graph_for_noisy_input() {
        let nodes = ids(&[1, 2, 3, 4, 5]);
        let mut candidates = Vec::new();
        for a in 1..=6 {
            for b in 1..=6 {
                candidates.push(record(a, b, 0.5 + (a * b % 5) as f32 / 10.0));
            }
        }

        let outcome = EdgeDeduplicator::new(&nodes).dedup(&candidates);

        let mut keys = HashSet::new();
        for edge in &outcome.edges {
            assert_ne!(edge.a, edge.b);
            assert!(edge.a < edge.b);
            assert!(nodes.contains(&edge.a) && nodes.contains(&edge.b));
            assert!(keys.insert(edge.key()), "duplicate pair {:?}", edge.key());
        }
        // 5 known nodes -> 10 unordered pairs
        assert_eq!(outcome.edges.len(), 10);
        assert_eq!(outcome.edges.len() + outcome.dropped.len(), candidates.len());
    }
}
