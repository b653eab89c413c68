//! Radial layout
//!
//! Places nodes evenly on one circle around the viewport center, in
//! snapshot order. Computed once; every node is pinned where it lands.

use serde::{Deserialize, Serialize};

use super::{Layout, LayoutEngine, LayoutMode, LayoutState, NodeState, ViewportSize};
use crate::snapshot::GraphSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Circle radius as a fraction of `min(width, height)`
    pub radius_fraction: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            radius_fraction: 1.0 / 3.0,
        }
    }
}

pub struct RadialLayout {
    config: RadialConfig,
}

impl RadialLayout {
    pub fn new(config: RadialConfig) -> Self {
        Self { config }
    }

    /// Circle radius for a viewport
    pub fn radius(&self, viewport: ViewportSize) -> f32 {
        viewport.width.min(viewport.height) * self.config.radius_fraction
    }

    /// Positions for `count` nodes; a lone node sits at the center
    pub fn positions(&self, count: usize, viewport: ViewportSize) -> Vec<(f32, f32)> {
        let (cx, cy) = viewport.center();
        if count == 1 {
            return vec![(cx, cy)];
        }
        let radius = self.radius(viewport);
        (0..count)
            .map(|i| {
                let theta = (i as f32 / count as f32) * std::f32::consts::TAU;
                (cx + radius * theta.cos(), cy + radius * theta.sin())
            })
            .collect()
    }
}

impl LayoutEngine for RadialLayout {
    fn compute(&self, snapshot: &GraphSnapshot, viewport: ViewportSize) -> Layout {
        let nodes = self
            .positions(snapshot.nodes().len(), viewport)
            .into_iter()
            .map(|(x, y)| NodeState::pinned_at(x, y))
            .collect();
        Layout::Static(LayoutState { nodes })
    }

    fn mode(&self) -> LayoutMode {
        LayoutMode::Radial
    }
}
