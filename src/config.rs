//! Engine configuration
//!
//! All tunables live in one [`EngineConfig`] tree. Every section has a
//! `Default`, and missing keys in a YAML file fall back to those defaults,
//! so a config file only needs to name what it changes:
//!
//! ```yaml
//! simulation:
//!   charge: -400
//! viewport:
//!   width: 1200
//!   height: 900
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::feed::FeedBounds;
use crate::interaction::InteractionConfig;
use crate::layout::force::SimulationConfig;
use crate::layout::hierarchical::HierarchicalConfig;
use crate::layout::radial::RadialConfig;
use crate::render::RenderStyle;
use crate::viewport::ViewportConfig;

/// Complete configuration for a view session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Force-directed layout parameters
    pub simulation: SimulationConfig,
    /// Radial layout parameters
    pub radial: RadialConfig,
    /// Hierarchical layout parameters
    pub hierarchical: HierarchicalConfig,
    /// Viewport size and zoom limits
    pub viewport: ViewportConfig,
    /// Pointer gesture thresholds
    pub interaction: InteractionConfig,
    /// Visual encoding of nodes, edges and labels
    pub render: RenderStyle,
    /// Bounds applied to incoming feeds
    pub feed: FeedBounds,
}

impl EngineConfig {
    /// Parse a config from YAML text
    pub fn from_yaml_str(content: &str) -> GraphResult<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| GraphError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: &Path) -> GraphResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> GraphResult<()> {
        let vp = &self.viewport;
        if vp.width <= 0.0 || vp.height <= 0.0 {
            return Err(GraphError::Config(format!(
                "viewport size must be positive, got {}x{}",
                vp.width, vp.height
            )));
        }
        if vp.min_scale <= 0.0 || vp.min_scale > vp.max_scale {
            return Err(GraphError::Config(format!(
                "invalid zoom range [{}, {}]",
                vp.min_scale, vp.max_scale
            )));
        }
        if vp.zoom_step <= 1.0 {
            return Err(GraphError::Config(format!(
                "zoom_step must be greater than 1, got {}",
                vp.zoom_step
            )));
        }
        if self.hierarchical.row_width == 0 {
            return Err(GraphError::Config("hierarchical.row_width must be at least 1".into()));
        }
        let sim = &self.simulation;
        if !(0.0..1.0).contains(&sim.alpha_decay) || sim.alpha_decay == 0.0 {
            return Err(GraphError::Config(format!(
                "simulation.alpha_decay must be in (0, 1), got {}",
                sim.alpha_decay
            )));
        }
        if !(0.0..=1.0).contains(&sim.velocity_decay) {
            return Err(GraphError::Config(format!(
                "simulation.velocity_decay must be in [0, 1], got {}",
                sim.velocity_decay
            )));
        }
        Ok(())
    }
}
