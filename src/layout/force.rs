//! Force-directed layout
//!
//! A CPU force simulation modeled after d3-force. Each tick applies, in
//! order, link springs, pairwise repulsion, a weak centering pull and
//! collision separation, then integrates velocities with damping and cools
//! `alpha`. Once `alpha` drops below `alpha_min` the simulation is settled
//! and further ticks are no-ops until a drag re-heats it.
//!
//! Pinned nodes still exert forces on their neighbours but never move on
//! their own: integration snaps them to `(fx, fy)` with zero velocity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Layout, LayoutEngine, LayoutMode, LayoutState, NodeState, ViewportSize};
use crate::snapshot::GraphSnapshot;

/// Configuration for the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Repulsion strength (negative = repulsion)
    pub charge: f32,
    /// Link distance (rest length)
    pub link_distance: f32,
    /// Link strength, divided by the smaller endpoint degree
    pub link_strength: f32,
    /// Strength of the pull of the centroid toward the viewport center
    pub center_strength: f32,
    /// Collision radius of each node; two nodes overlap below twice this
    pub collision_radius: f32,
    /// Fraction of an overlap resolved per tick
    pub collision_strength: f32,
    /// Velocity decay (friction), applied each tick
    pub velocity_decay: f32,
    /// Maximum speed per tick
    pub max_velocity: f32,
    /// Minimum distance for force calculations (avoids singularity)
    pub distance_min: f32,
    /// Minimum alpha before stopping
    pub alpha_min: f32,
    /// Alpha decay rate
    pub alpha_decay: f32,
    /// Alpha held while a node is being dragged
    pub reheat_alpha: f32,
    /// Radius of the circle nodes are seeded on
    pub initial_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            charge: -350.0,
            link_distance: 120.0,
            link_strength: 1.0,
            center_strength: 0.05,
            collision_radius: 28.0,
            collision_strength: 0.7,
            velocity_decay: 0.4,
            max_velocity: 100.0,
            distance_min: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            reheat_alpha: 0.3,
            initial_radius: 100.0,
        }
    }
}

/// Lifecycle of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// Seeded, no tick run yet
    Ready,
    /// Ticking
    Simulating,
    /// Cooled below `alpha_min`; ticks are no-ops
    Settled,
}

/// A link between two node indices
#[derive(Debug, Clone)]
struct SimLink {
    source: usize,
    target: usize,
    /// Spring constant after degree normalization
    strength: f32,
    /// Share of the correction applied to the target
    bias: f32,
}

/// Running force simulation over one snapshot
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    state: LayoutState,
    links: Vec<SimLink>,
    config: SimulationConfig,
    center: (f32, f32),
    alpha: f32,
    alpha_target: f32,
    phase: SimulationPhase,
    ticks: usize,
}

impl ForceSimulation {
    /// Seed a simulation for `snapshot` centered in `viewport`
    pub fn new(snapshot: &GraphSnapshot, viewport: ViewportSize, config: SimulationConfig) -> Self {
        let total = snapshot.nodes().len();
        let (cx, cy) = viewport.center();

        // Distribute nodes in a circle initially
        let nodes = (0..total)
            .map(|i| {
                if total == 1 {
                    return NodeState::at(cx, cy);
                }
                let angle = std::f32::consts::TAU * (i as f32) / (total as f32);
                NodeState::at(
                    cx + config.initial_radius * angle.cos(),
                    cy + config.initial_radius * angle.sin(),
                )
            })
            .collect();

        let degrees: Vec<usize> = snapshot.nodes().iter().map(|n| n.degree).collect();
        let links = snapshot
            .edge_indices()
            .iter()
            .map(|&(source, target, _)| {
                let (ds, dt) = (degrees[source].max(1) as f32, degrees[target].max(1) as f32);
                SimLink {
                    source,
                    target,
                    strength: config.link_strength / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        Self {
            state: LayoutState { nodes },
            links,
            config,
            center: (cx, cy),
            alpha: 1.0,
            alpha_target: 0.0,
            phase: SimulationPhase::Ready,
            ticks: 0,
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_settled(&self) -> bool {
        self.phase == SimulationPhase::Settled
    }

    /// Run one simulation tick; returns false once settled
    pub fn tick(&mut self) -> bool {
        if self.phase == SimulationPhase::Settled {
            return false;
        }
        if self.state.is_empty() {
            self.phase = SimulationPhase::Settled;
            return false;
        }
        self.phase = SimulationPhase::Simulating;

        self.apply_link_force();
        self.apply_many_body_force();
        self.apply_center_force();
        self.apply_collision();
        self.integrate();

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;

        if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
            self.phase = SimulationPhase::Settled;
            debug!(ticks = self.ticks, "force simulation settled");
        }
        true
    }

    /// Run until settled or `max_ticks` have elapsed; returns ticks run
    pub fn run_to_convergence(&mut self, max_ticks: usize) -> usize {
        let mut ran = 0;
        while ran < max_ticks && self.tick() {
            ran += 1;
        }
        ran
    }

    /// Pin a node under the pointer and re-heat the simulation
    pub fn drag_to(&mut self, index: usize, x: f32, y: f32) -> bool {
        let Some(node) = self.state.nodes.get_mut(index) else {
            return false;
        };
        node.pin(x, y);
        self.alpha_target = self.config.reheat_alpha;
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.phase = SimulationPhase::Simulating;
        true
    }

    /// Release a dragged node; alpha cools again once nothing is pinned
    pub fn release(&mut self, index: usize) {
        if let Some(node) = self.state.nodes.get_mut(index) {
            node.unpin();
        }
        if !self.state.nodes.iter().any(NodeState::is_pinned) {
            self.alpha_target = 0.0;
        }
    }

    /// Spring force between linked nodes (Hooke's law)
    fn apply_link_force(&mut self) {
        let alpha = self.alpha;
        for link in &self.links {
            let (s, t) = (self.state.nodes[link.source], self.state.nodes[link.target]);
            let (mut dx, mut dy) = (t.x - s.x, t.y - s.y);
            if dx == 0.0 && dy == 0.0 {
                dx = jiggle(link.source * 31 + link.target);
                dy = jiggle(link.target * 31 + link.source);
            }
            let dist = (dx * dx + dy * dy).sqrt();
            let k = (dist - self.config.link_distance) / dist * alpha * link.strength;
            let (fx, fy) = (dx * k, dy * k);

            let target = &mut self.state.nodes[link.target];
            target.vx -= fx * link.bias;
            target.vy -= fy * link.bias;
            let source = &mut self.state.nodes[link.source];
            source.vx += fx * (1.0 - link.bias);
            source.vy += fy * (1.0 - link.bias);
        }
    }

    /// Repulsion between all node pairs (Coulomb's law)
    fn apply_many_body_force(&mut self) {
        let n = self.state.nodes.len();
        let min_sq = self.config.distance_min * self.config.distance_min;

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.state.nodes[i], self.state.nodes[j]);
                let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
                if dx == 0.0 && dy == 0.0 {
                    dx = jiggle(i * 31 + j);
                    dy = jiggle(j * 31 + i);
                }
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq < min_sq {
                    dist_sq = (min_sq * dist_sq).sqrt();
                }

                // Negative charge pushes i away from j
                let w = self.config.charge * self.alpha / dist_sq;
                self.state.nodes[i].vx += dx * w;
                self.state.nodes[i].vy += dy * w;
                self.state.nodes[j].vx -= dx * w;
                self.state.nodes[j].vy -= dy * w;
            }
        }
    }

    /// Pull the centroid toward the viewport center
    fn apply_center_force(&mut self) {
        let n = self.state.nodes.len() as f32;
        let (sx, sy) = self
            .state
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let shift_x = (sx / n - self.center.0) * self.config.center_strength * self.alpha;
        let shift_y = (sy / n - self.center.1) * self.config.center_strength * self.alpha;

        for node in &mut self.state.nodes {
            node.vx -= shift_x;
            node.vy -= shift_y;
        }
    }

    /// Push overlapping nodes apart along the line between their centers
    fn apply_collision(&mut self) {
        let n = self.state.nodes.len();
        let r = 2.0 * self.config.collision_radius;

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (self.state.nodes[i], self.state.nodes[j]);
                let (mut dx, mut dy) = (a.x + a.vx - b.x - b.vx, a.y + a.vy - b.y - b.vy);
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq >= r * r {
                    continue;
                }
                if dist_sq == 0.0 {
                    dx = jiggle(i * 17 + j);
                    dy = jiggle(j * 17 + i);
                    dist_sq = dx * dx + dy * dy;
                }
                let dist = dist_sq.sqrt();
                let k = (r - dist) / dist * self.config.collision_strength * 0.5;

                self.state.nodes[i].vx += dx * k;
                self.state.nodes[i].vy += dy * k;
                self.state.nodes[j].vx -= dx * k;
                self.state.nodes[j].vy -= dy * k;
            }
        }
    }

    /// Apply velocity decay and move free nodes; hold pinned ones
    fn integrate(&mut self) {
        let keep = 1.0 - self.config.velocity_decay;
        let max_v = self.config.max_velocity;

        for node in &mut self.state.nodes {
            if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
                node.x = fx;
                node.y = fy;
                node.vx = 0.0;
                node.vy = 0.0;
                continue;
            }

            node.vx *= keep;
            node.vy *= keep;
            let speed = (node.vx * node.vx + node.vy * node.vy).sqrt();
            if speed > max_v {
                node.vx *= max_v / speed;
                node.vy *= max_v / speed;
            }
            node.x += node.vx;
            node.y += node.vy;
        }
    }
}

/// Tiny deterministic offset used to separate coincident points
fn jiggle(seed: usize) -> f32 {
    let h = ((seed as f32 + 1.0) * 12.9898).sin() * 43758.547;
    (h.fract() - 0.5) * 1e-3
}

/// Iterative physics layout
pub struct ForceDirectedLayout {
    config: SimulationConfig,
}

impl ForceDirectedLayout {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl LayoutEngine for ForceDirectedLayout {
    fn compute(&self, snapshot: &GraphSnapshot, viewport: ViewportSize) -> Layout {
        Layout::Simulated(ForceSimulation::new(snapshot, viewport, self.config.clone()))
    }

    fn mode(&self) -> LayoutMode {
        LayoutMode::Force
    }
}
