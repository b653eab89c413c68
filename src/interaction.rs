//! Pointer gesture state machine
//!
//! Turns raw pointer events into [`Action`]s. The controller knows nothing
//! about layouts or transforms; the caller resolves hits beforehand and
//! applies the resulting actions afterwards.

use serde::{Deserialize, Serialize};

use crate::snapshot::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel (screen pixels) below which a drag still counts as a click
    pub click_threshold: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold: 5.0,
        }
    }
}

/// Current gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        node: NodeId,
        /// Cumulative pointer travel since pointer-down
        travelled: f32,
        last: (f32, f32),
    },
    Panning {
        last: (f32, f32),
    },
}

/// Effect of a pointer event on the rest of the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move a dragged node to a screen position; only sent once the pointer
    /// has travelled past the click threshold
    DragTo { node: NodeId, sx: f32, sy: f32 },
    /// Translate the view by screen pixels
    Pan { dx: f32, dy: f32 },
    /// Drag ended
    Release(NodeId),
    /// Pointer went down and up on a node without moving far
    Click(NodeId),
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    click_threshold: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            click_threshold: config.click_threshold,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Start a gesture; `hit` is the node under the pointer, if any
    pub fn pointer_down(&mut self, sx: f32, sy: f32, hit: Option<NodeId>) {
        self.state = match hit {
            Some(node) => InteractionState::Dragging {
                node,
                travelled: 0.0,
                last: (sx, sy),
            },
            None => InteractionState::Panning { last: (sx, sy) },
        };
    }

    pub fn pointer_move(&mut self, sx: f32, sy: f32) -> Option<Action> {
        match &mut self.state {
            InteractionState::Idle => None,
            InteractionState::Dragging {
                node,
                travelled,
                last,
            } => {
                *travelled += (sx - last.0).hypot(sy - last.1);
                *last = (sx, sy);
                // Still a potential click: leave the node where it is
                if *travelled < self.click_threshold {
                    return None;
                }
                Some(Action::DragTo {
                    node: *node,
                    sx,
                    sy,
                })
            }
            InteractionState::Panning { last } => {
                let (dx, dy) = (sx - last.0, sy - last.1);
                *last = (sx, sy);
                Some(Action::Pan { dx, dy })
            }
        }
    }

    /// Finish the gesture
    pub fn pointer_up(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging {
                node, travelled, ..
            } => {
                let mut actions = vec![Action::Release(node)];
                if travelled < self.click_threshold {
                    actions.push(Action::Click(node));
                }
                actions
            }
            InteractionState::Panning { .. } | InteractionState::Idle => Vec::new(),
        }
    }

    /// Abort the gesture (pointer left the surface); never produces a click
    pub fn cancel(&mut self) -> Option<Action> {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging { node, .. } => Some(Action::Release(node)),
            _ => None,
        }
    }
}
