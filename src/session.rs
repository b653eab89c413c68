//! View session
//!
//! A [`ViewSession`] owns everything one interactive view needs: the current
//! snapshot, the active layout (and with it any running simulation), the
//! viewport, the gesture state and the selection. The host drives it one
//! [`frame`](ViewSession::frame) at a time and forwards pointer input;
//! outgoing notifications are queued as [`HostEvent`]s.
//!
//! Only the feed fetch is asynchronous. Its result is handed to
//! [`load`](ViewSession::load), which swaps the snapshot in one step and
//! restarts the layout from scratch.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::GraphResult;
use crate::feed::{FeedPayload, FeedSource};
use crate::interaction::{Action, InteractionController};
use crate::layout::{Layout, LayoutMode};
use crate::render::svg::{PageBody, render_page};
use crate::render::{Frame, Renderer, Surface, SvgSurface};
use crate::snapshot::{GraphMetrics, GraphSnapshot, NodeId, SnapshotReport};
use crate::viewport::ViewportController;

/// Lifecycle of the data behind a view
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EngineState {
    /// Waiting for the first fetch
    #[default]
    Loading,
    /// Fetched successfully but there is nothing to draw
    Empty,
    /// The fetch failed; nothing is drawn
    Error(String),
    Ready,
}

/// Notifications for the host application
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    NodeSelected(NodeId),
    ViewModeChanged(LayoutMode),
    MetricsChanged(GraphMetrics),
}

pub struct ViewSession {
    config: EngineConfig,
    snapshot: GraphSnapshot,
    report: SnapshotReport,
    mode: LayoutMode,
    layout: Option<Layout>,
    viewport: ViewportController,
    interaction: InteractionController,
    renderer: Renderer,
    selection: Option<NodeId>,
    state: EngineState,
    events: VecDeque<HostEvent>,
}

impl ViewSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            snapshot: GraphSnapshot::default(),
            report: SnapshotReport::default(),
            mode: LayoutMode::default(),
            layout: None,
            viewport: ViewportController::new(&config.viewport),
            interaction: InteractionController::new(&config.interaction),
            renderer: Renderer::new(config.render.clone()),
            selection: None,
            state: EngineState::Loading,
            events: VecDeque::new(),
            config,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Diagnostics from building the current snapshot
    pub fn report(&self) -> &SnapshotReport {
        &self.report
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn metrics(&self) -> GraphMetrics {
        self.snapshot.metrics()
    }

    /// Fetch from `source` and load the result
    pub async fn refresh(&mut self, source: &impl FeedSource) {
        self.state = EngineState::Loading;
        let result = source.fetch().await;
        self.load(result);
    }

    /// Replace the snapshot with the outcome of a fetch
    ///
    /// Any running simulation, drag or selection belongs to the old snapshot
    /// and is discarded.
    pub fn load(&mut self, result: GraphResult<FeedPayload>) {
        self.layout = None;
        self.selection = None;
        self.interaction.cancel();

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "feed fetch failed");
                self.snapshot = GraphSnapshot::default();
                self.report = SnapshotReport::default();
                self.state = EngineState::Error(e.to_string());
                return;
            }
        };

        let bounded = self.config.feed.apply(&payload);
        let (snapshot, report) = GraphSnapshot::from_feed(&bounded);
        info!(
            nodes = snapshot.nodes().len(),
            edges = snapshot.edges().len(),
            dropped_edges = report.dropped_edges.len(),
            duplicate_nodes = report.duplicate_nodes.len(),
            "snapshot loaded"
        );
        self.snapshot = snapshot;
        self.report = report;

        if self.snapshot.is_empty() {
            self.state = EngineState::Empty;
        } else {
            self.state = EngineState::Ready;
            self.restart_layout();
        }
        self.events
            .push_back(HostEvent::MetricsChanged(self.snapshot.metrics()));
    }

    /// Switch layout strategy, dropping the current layout
    pub fn set_mode(&mut self, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        info!(from = %self.mode, to = %mode, "layout mode changed");
        self.mode = mode;
        self.interaction.cancel();
        self.restart_layout();
        self.events.push_back(HostEvent::ViewModeChanged(mode));
    }

    fn restart_layout(&mut self) {
        self.layout = match self.state {
            EngineState::Ready => Some(
                self.mode
                    .engine(&self.config)
                    .compute(&self.snapshot, self.viewport.size()),
            ),
            _ => None,
        };
    }

    /// Advance one frame and draw it
    ///
    /// Returns whether another frame is needed (simulation still running or
    /// viewport still animating).
    pub fn frame(&mut self, surface: &mut impl Surface) -> bool {
        let animating = self.viewport.update_animation();

        let Some(layout) = self.layout.as_mut() else {
            let size = self.viewport.size();
            surface.clear(size.width, size.height, &self.renderer.style().background);
            return animating;
        };
        layout.tick();

        self.renderer.render(
            &Frame {
                snapshot: &self.snapshot,
                layout: layout.state(),
                viewport: &self.viewport,
                selection: self.selection,
            },
            surface,
        );
        animating || !layout.is_settled()
    }

    /// Tick the layout without drawing until it settles; returns ticks run
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let Some(layout) = self.layout.as_mut() else {
            return 0;
        };
        let mut ran = 0;
        while ran < max_ticks && layout.tick() {
            ran += 1;
        }
        if !layout.is_settled() {
            warn!(max_ticks, "layout did not settle");
        }
        ran
    }

    pub fn pointer_down(&mut self, sx: f32, sy: f32) {
        let hit = self.layout.as_ref().and_then(|layout| {
            self.renderer
                .node_at(&self.snapshot, layout.state(), &self.viewport, sx, sy)
        });
        self.interaction.pointer_down(sx, sy, hit);
    }

    pub fn pointer_move(&mut self, sx: f32, sy: f32) {
        if let Some(action) = self.interaction.pointer_move(sx, sy) {
            self.apply(action);
        }
    }

    pub fn pointer_up(&mut self) {
        for action in self.interaction.pointer_up() {
            self.apply(action);
        }
    }

    /// Pointer left the surface
    pub fn pointer_leave(&mut self) {
        if let Some(action) = self.interaction.cancel() {
            self.apply(action);
        }
    }

    /// Wheel zoom around the pointer
    pub fn wheel(&mut self, factor: f32, sx: f32, sy: f32) {
        self.viewport.zoom_at(factor, sx, sy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Animate the viewport to frame the whole graph
    pub fn fit_to_view(&mut self, padding: f32) {
        if let Some(layout) = &self.layout {
            let bounds = self.renderer.bounds(&self.snapshot, layout.state());
            self.viewport.fit_to_bounds(&bounds, padding);
        }
    }

    /// Jump to the end of any viewport animation
    pub fn finish_animation(&mut self) {
        while self.viewport.update_animation() {}
    }

    /// Restore the identity transform and clear the selection
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.selection = None;
    }

    /// Stop everything; the session draws nothing until the next load
    pub fn teardown(&mut self) {
        self.interaction.cancel();
        self.layout = None;
        self.selection = None;
        debug!("view session torn down");
    }

    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        self.events.drain(..).collect()
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::DragTo { node, sx, sy } => {
                let (x, y) = self.viewport.screen_to_world(sx, sy);
                if let (Some(layout), Some(index)) =
                    (self.layout.as_mut(), self.snapshot.index_of(node))
                {
                    layout.drag_to(index, x, y);
                }
            }
            Action::Pan { dx, dy } => self.viewport.pan(dx, dy),
            Action::Release(node) => {
                if let (Some(layout), Some(index)) =
                    (self.layout.as_mut(), self.snapshot.index_of(node))
                {
                    layout.release(index);
                }
            }
            Action::Click(node) => {
                debug!(node, "node selected");
                self.selection = Some(node);
                self.events.push_back(HostEvent::NodeSelected(node));
            }
        }
    }

    /// Render the current frame as `(graph.svg, index.html)` contents
    pub fn export(&mut self, title: &str) -> GraphResult<(String, String)> {
        let mut surface = SvgSurface::new();
        self.frame(&mut surface);
        let svg = surface.to_svg()?;

        let body = match &self.state {
            EngineState::Error(message) => PageBody::Error(message),
            EngineState::Empty => PageBody::Empty,
            EngineState::Loading | EngineState::Ready => PageBody::Graph(&svg),
        };
        let page = render_page(title, self.mode, &self.metrics(), body)?;
        Ok((svg, page))
    }
}
