//! Hierarchical layout
//!
//! Ranks nodes by descending degree and fills fixed-width rows top to
//! bottom. Equal degrees keep snapshot order (the sort is stable), so the
//! result is fully deterministic.

use serde::{Deserialize, Serialize};

use super::{Layout, LayoutEngine, LayoutMode, LayoutState, NodeState, ViewportSize};
use crate::snapshot::GraphSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalConfig {
    /// Nodes per row
    pub row_width: usize,
    /// Vertical distance between rows
    pub row_height: f32,
    /// y of the first row
    pub top_margin: f32,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            row_width: 3,
            row_height: 120.0,
            top_margin: 60.0,
        }
    }
}

pub struct HierarchicalLayout {
    config: HierarchicalConfig,
}

impl HierarchicalLayout {
    pub fn new(config: HierarchicalConfig) -> Self {
        Self { config }
    }

    /// Snapshot indices ordered by rank (highest degree first)
    pub fn rank(snapshot: &GraphSnapshot) -> Vec<usize> {
        let mut order: Vec<usize> = (0..snapshot.nodes().len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(snapshot.nodes()[i].degree));
        order
    }

    /// Row index of the node at `rank`
    pub fn row_of(&self, rank: usize) -> usize {
        rank / self.config.row_width.max(1)
    }
}

impl LayoutEngine for HierarchicalLayout {
    fn compute(&self, snapshot: &GraphSnapshot, viewport: ViewportSize) -> Layout {
        let total = snapshot.nodes().len();
        let row_width = self.config.row_width.max(1);
        let mut nodes = vec![NodeState::default(); total];

        for (rank, index) in Self::rank(snapshot).into_iter().enumerate() {
            let row = self.row_of(rank);
            let col = rank % row_width;
            let row_len = row_width.min(total - row * row_width);

            let x = viewport.width * (col + 1) as f32 / (row_len + 1) as f32;
            let y = self.config.top_margin + row as f32 * self.config.row_height;
            nodes[index] = NodeState::pinned_at(x, y);
        }

        Layout::Static(LayoutState { nodes })
    }

    fn mode(&self) -> LayoutMode {
        LayoutMode::Hierarchical
    }
}
