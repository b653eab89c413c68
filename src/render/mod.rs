//! Frame rendering
//!
//! [`Renderer`] is a pure function of the snapshot, the layout positions,
//! the viewport transform and the current selection. It draws onto any
//! [`Surface`]: edges first, then nodes, then labels on top.

pub mod svg;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutState;
use crate::snapshot::{DegreeTier, GraphSnapshot, Node, NodeId};
use crate::viewport::{BoundingBox, ViewportController};

pub use svg::SvgSurface;

/// Label visibility options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Master toggle for all labels
    pub all_labels: bool,
    /// Show node titles (when all_labels is true)
    pub node_labels: bool,
    /// Show edge strengths (when all_labels is true)
    pub edge_labels: bool,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            all_labels: true,
            node_labels: true,
            edge_labels: false,
        }
    }
}

impl LabelOptions {
    pub fn show_node_labels(&self) -> bool {
        self.all_labels && self.node_labels
    }

    pub fn show_edge_labels(&self) -> bool {
        self.all_labels && self.edge_labels
    }

    pub fn toggle_all(&mut self) {
        self.all_labels = !self.all_labels;
    }

    pub fn toggle_node_labels(&mut self) {
        self.node_labels = !self.node_labels;
    }

    pub fn toggle_edge_labels(&mut self) {
        self.edge_labels = !self.edge_labels;
    }
}

/// Visual encoding of nodes, edges and labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Radius of a node with no edges
    pub base_radius: f32,
    /// Radius added per incident edge
    pub radius_per_degree: f32,
    /// Titles longer than this are cut and suffixed with `...`
    pub label_max_chars: usize,
    /// Unscaled label font size
    pub font_size: f32,
    /// Edges weaker than this are drawn dashed
    pub dash_threshold: f32,
    pub background: String,
    pub edge_color: String,
    pub label_color: String,
    pub high_degree_color: String,
    pub medium_degree_color: String,
    pub low_degree_color: String,
    pub selected_color: String,
    pub labels: LabelOptions,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            base_radius: 8.0,
            radius_per_degree: 2.0,
            label_max_chars: 20,
            font_size: 12.0,
            dash_threshold: 0.5,
            background: "#1a1a2e".to_string(),
            edge_color: "#8888a0".to_string(),
            label_color: "#e6e6f0".to_string(),
            high_degree_color: "#e4572e".to_string(),
            medium_degree_color: "#f3a712".to_string(),
            low_degree_color: "#4f86c6".to_string(),
            selected_color: "#29bf12".to_string(),
            labels: LabelOptions::default(),
        }
    }
}

/// Stroke parameters for one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke<'a> {
    pub color: &'a str,
    pub width: f32,
    pub opacity: f32,
    pub dashed: bool,
}

/// A drawing target
///
/// All coordinates are screen coordinates; the renderer applies the
/// viewport transform before calling into the surface.
pub trait Surface {
    /// Start a new frame
    fn clear(&mut self, width: f32, height: f32, background: &str);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke<'_>);

    fn circle(&mut self, center: (f32, f32), radius: f32, fill: &str);

    /// Text horizontally centered on `at`
    fn text(&mut self, at: (f32, f32), content: &str, size: f32, fill: &str);
}

/// Cut `title` to `max_chars` characters, appending `...` when it was longer
pub fn truncate_label(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut label: String = title.chars().take(max_chars).collect();
    label.push_str("...");
    label
}

/// Everything a single frame draws
pub struct Frame<'a> {
    pub snapshot: &'a GraphSnapshot,
    pub layout: &'a LayoutState,
    pub viewport: &'a ViewportController,
    pub selection: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn labels_mut(&mut self) -> &mut LabelOptions {
        &mut self.style.labels
    }

    /// Unscaled stroke width for an edge of the given strength
    pub fn edge_width(&self, strength: f32) -> f32 {
        1.0 + 3.0 * strength
    }

    pub fn edge_opacity(&self, strength: f32) -> f32 {
        0.2 + 0.6 * strength
    }

    pub fn is_dashed(&self, strength: f32) -> bool {
        strength < self.style.dash_threshold
    }

    /// Unscaled node radius
    pub fn node_radius(&self, degree: usize) -> f32 {
        self.style.base_radius + self.style.radius_per_degree * degree as f32
    }

    pub fn node_color(&self, node: &Node, selected: bool) -> &str {
        if selected {
            return &self.style.selected_color;
        }
        match node.tier() {
            DegreeTier::High => &self.style.high_degree_color,
            DegreeTier::Medium => &self.style.medium_degree_color,
            DegreeTier::Low => &self.style.low_degree_color,
        }
    }

    fn font_size(&self, scale: f32) -> f32 {
        (self.style.font_size * scale).clamp(8.0, 16.0)
    }

    /// Draw one frame
    pub fn render(&self, frame: &Frame<'_>, surface: &mut impl Surface) {
        let size = frame.viewport.size();
        surface.clear(size.width, size.height, &self.style.background);

        self.render_edges(frame, surface);
        self.render_nodes(frame, surface);

        if self.style.labels.show_edge_labels() {
            self.render_edge_labels(frame, surface);
        }
        if self.style.labels.show_node_labels() {
            self.render_node_labels(frame, surface);
        }
    }

    fn render_edges(&self, frame: &Frame<'_>, surface: &mut impl Surface) {
        let scale = frame.viewport.scale();
        for &(a, b, strength) in frame.snapshot.edge_indices() {
            let (Some(from), Some(to)) = (frame.layout.position(a), frame.layout.position(b))
            else {
                continue;
            };
            let stroke = Stroke {
                color: &self.style.edge_color,
                width: self.edge_width(strength) * scale,
                opacity: self.edge_opacity(strength),
                dashed: self.is_dashed(strength),
            };
            surface.line(
                frame.viewport.world_to_screen(from.0, from.1),
                frame.viewport.world_to_screen(to.0, to.1),
                stroke,
            );
        }
    }

    fn render_nodes(&self, frame: &Frame<'_>, surface: &mut impl Surface) {
        let scale = frame.viewport.scale();
        for (node, state) in frame.snapshot.nodes().iter().zip(&frame.layout.nodes) {
            let center = frame.viewport.world_to_screen(state.x, state.y);
            let selected = frame.selection == Some(node.id);
            surface.circle(
                center,
                self.node_radius(node.degree) * scale,
                self.node_color(node, selected),
            );
        }
    }

    /// Titles below each node
    fn render_node_labels(&self, frame: &Frame<'_>, surface: &mut impl Surface) {
        let scale = frame.viewport.scale();
        let font_size = self.font_size(scale);
        for (node, state) in frame.snapshot.nodes().iter().zip(&frame.layout.nodes) {
            let (cx, cy) = frame.viewport.world_to_screen(state.x, state.y);
            let radius = self.node_radius(node.degree) * scale;
            let label = truncate_label(&node.title, self.style.label_max_chars);
            surface.text(
                (cx, cy + radius + font_size),
                &label,
                font_size,
                &self.style.label_color,
            );
        }
    }

    /// Strength values at edge midpoints
    fn render_edge_labels(&self, frame: &Frame<'_>, surface: &mut impl Surface) {
        let font_size = self.font_size(frame.viewport.scale()) * 0.8;
        for &(a, b, strength) in frame.snapshot.edge_indices() {
            let (Some(from), Some(to)) = (frame.layout.position(a), frame.layout.position(b))
            else {
                continue;
            };
            let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
            surface.text(
                frame.viewport.world_to_screen(mid.0, mid.1),
                &format!("{strength:.2}"),
                font_size,
                &self.style.label_color,
            );
        }
    }

    /// Find the node under a screen point (for click and drag detection)
    ///
    /// Nodes drawn later sit on top, so the search runs back to front.
    pub fn node_at(
        &self,
        snapshot: &GraphSnapshot,
        layout: &LayoutState,
        viewport: &ViewportController,
        sx: f32,
        sy: f32,
    ) -> Option<NodeId> {
        let scale = viewport.scale();
        snapshot
            .nodes()
            .iter()
            .zip(&layout.nodes)
            .rev()
            .find(|(node, state)| {
                let (cx, cy) = viewport.world_to_screen(state.x, state.y);
                let radius = self.node_radius(node.degree) * scale;
                let (dx, dy) = (sx - cx, sy - cy);
                dx * dx + dy * dy <= radius * radius
            })
            .map(|(node, _)| node.id)
    }

    /// World-space bounds of every drawn node
    pub fn bounds(&self, snapshot: &GraphSnapshot, layout: &LayoutState) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for (node, state) in snapshot.nodes().iter().zip(&layout.nodes) {
            bounds.include_circle(state.x, state.y, self.node_radius(node.degree));
        }
        bounds
    }
}
