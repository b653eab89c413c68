//! simgraph - layout and rendering engine for semantic-similarity knowledge graphs.
//!
//! A feed of content items and similarity relationships becomes an immutable
//! [`GraphSnapshot`]; a [`LayoutEngine`] places it (force-directed, radial or
//! hierarchical); a [`ViewSession`] drives the simulation, viewport and
//! pointer gestures frame by frame and renders through a [`Surface`].

pub mod config;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod viewport;

pub use config::EngineConfig;
pub use error::{GraphError, GraphResult};
pub use feed::{FeedBounds, FeedPayload, FeedSource, FileFeed};
pub use layout::{Layout, LayoutEngine, LayoutMode, LayoutState, ViewportSize};
pub use render::{Renderer, Surface, SvgSurface};
pub use session::{EngineState, HostEvent, ViewSession};
pub use snapshot::{GraphMetrics, GraphSnapshot, NodeId};
pub use viewport::ViewportController;
