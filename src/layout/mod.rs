//! Layout strategies
//!
//! Every strategy shares one contract: [`LayoutEngine::compute`] takes a
//! snapshot and the viewport size and returns a [`Layout`]. A static layout
//! is final as soon as it is computed; a simulated layout keeps moving until
//! its simulation settles. Callers drive both through the same methods, so
//! the render loop never needs to know which mode is active.
//!
//! Layout state is index-aligned with `snapshot.nodes()`.

pub mod force;
pub mod hierarchical;
pub mod radial;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::snapshot::GraphSnapshot;

pub use force::{ForceDirectedLayout, ForceSimulation, SimulationPhase};
pub use hierarchical::HierarchicalLayout;
pub use radial::RadialLayout;

/// Size of the drawing area in screen units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Mutable per-node layout state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Pinned x, present while fixed by a drag or a static layout
    pub fx: Option<f32>,
    /// Pinned y, present while fixed by a drag or a static layout
    pub fy: Option<f32>,
}

impl NodeState {
    /// Free node at rest
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Node fixed at the given position
    pub fn pinned_at(x: f32, y: f32) -> Self {
        let mut node = Self::at(x, y);
        node.pin(x, y);
        node
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() && self.fy.is_some()
    }

    /// Fix the node at `(x, y)`; the position jumps there immediately
    pub fn pin(&mut self, x: f32, y: f32) {
        self.fx = Some(x);
        self.fy = Some(y);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }
}

/// Positions of every node in a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutState {
    pub nodes: Vec<NodeState>,
}

impl LayoutState {
    pub fn position(&self, index: usize) -> Option<(f32, f32)> {
        self.nodes.get(index).map(|n| (n.x, n.y))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Which layout strategy is active
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Force,
    Radial,
    Hierarchical,
}

impl LayoutMode {
    /// Build the layout engine for this mode
    pub fn engine(self, config: &EngineConfig) -> Box<dyn LayoutEngine> {
        match self {
            LayoutMode::Force => Box::new(ForceDirectedLayout::new(config.simulation.clone())),
            LayoutMode::Radial => Box::new(RadialLayout::new(config.radial.clone())),
            LayoutMode::Hierarchical => {
                Box::new(HierarchicalLayout::new(config.hierarchical.clone()))
            }
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutMode::Force => "force",
            LayoutMode::Radial => "radial",
            LayoutMode::Hierarchical => "hierarchical",
        };
        f.write_str(name)
    }
}

/// A layout strategy
pub trait LayoutEngine {
    /// Compute the layout of `snapshot` inside `viewport`
    fn compute(&self, snapshot: &GraphSnapshot, viewport: ViewportSize) -> Layout;

    /// The mode this engine implements
    fn mode(&self) -> LayoutMode;
}

/// A computed layout: either final positions or a running simulation
#[derive(Debug, Clone)]
pub enum Layout {
    Static(LayoutState),
    Simulated(ForceSimulation),
}

impl Layout {
    pub fn state(&self) -> &LayoutState {
        match self {
            Layout::Static(state) => state,
            Layout::Simulated(sim) => sim.state(),
        }
    }

    /// Advance one step; returns whether any position may have changed
    pub fn tick(&mut self) -> bool {
        match self {
            Layout::Static(_) => false,
            Layout::Simulated(sim) => sim.tick(),
        }
    }

    pub fn is_settled(&self) -> bool {
        match self {
            Layout::Static(_) => true,
            Layout::Simulated(sim) => sim.is_settled(),
        }
    }

    /// Move a dragged node; static layouts ignore drags and return false
    pub fn drag_to(&mut self, index: usize, x: f32, y: f32) -> bool {
        match self {
            Layout::Static(_) => false,
            Layout::Simulated(sim) => sim.drag_to(index, x, y),
        }
    }

    /// End a drag, letting the node move freely again
    pub fn release(&mut self, index: usize) {
        if let Layout::Simulated(sim) = self {
            sim.release(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedEdge, FeedNode, FeedPayload};

    fn snapshot(n: u64) -> GraphSnapshot {
        let payload = FeedPayload {
            nodes: (1..=n)
                .map(|id| FeedNode {
                    id,
                    title: format!("Node {id}"),
                })
                .collect(),
            edges: (1..n)
                .map(|id| FeedEdge {
                    source: id,
                    target: id + 1,
                    similarity: 0.7,
                })
                .collect(),
        };
        GraphSnapshot::from_feed(&payload).0
    }

    #[test]
    fn node_state_pin_and_unpin() {
        let mut node = NodeState::at(1.0, 2.0);
        node.vx = 3.0;
        assert!(!node.is_pinned());

        node.pin(10.0, 20.0);
        assert!(node.is_pinned());
        assert_eq!((node.x, node.y), (10.0, 20.0));
        assert_eq!(node.vx, 0.0);

        node.unpin();
        assert!(!node.is_pinned());
        assert_eq!((node.x, node.y), (10.0, 20.0));
    }

    #[test]
    fn every_mode_produces_one_state_per_node() {
        let config = EngineConfig::default();
        let snap = snapshot(7);
        let viewport = ViewportSize::new(800.0, 600.0);

        for mode in [LayoutMode::Force, LayoutMode::Radial, LayoutMode::Hierarchical] {
            let engine = mode.engine(&config);
            assert_eq!(engine.mode(), mode);
            let layout = engine.compute(&snap, viewport);
            assert_eq!(layout.state().len(), 7, "{mode}");
        }
    }

    #[test]
    fn static_layouts_are_settled_and_ignore_drags() {
        let config = EngineConfig::default();
        let snap = snapshot(4);
        let viewport = ViewportSize::new(800.0, 600.0);

        let mut layout = LayoutMode::Radial.engine(&config).compute(&snap, viewport);
        let before = layout.state().clone();

        assert!(layout.is_settled());
        assert!(!layout.tick());
        assert!(!layout.drag_to(0, 5.0, 5.0));
        layout.release(0);
        assert_eq!(layout.state(), &before);
    }

    #[test]
    fn force_layout_starts_unsettled() {
        let config = EngineConfig::default();
        let layout = LayoutMode::Force
            .engine(&config)
            .compute(&snapshot(3), ViewportSize::new(800.0, 600.0));
        assert!(!layout.is_settled());
    }

    #[test]
    fn mode_names() {
        assert_eq!(LayoutMode::Force.to_string(), "force");
        assert_eq!(LayoutMode::Hierarchical.to_string(), "hierarchical");
        let parsed: LayoutMode = serde_json::from_str("\"radial\"").unwrap();
        assert_eq!(parsed, LayoutMode::Radial);
    }
}
