//! Coordinator configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coordinator configuration flags
///
/// Set at construction and changeable until the coordinator begins play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Trigger initialization as part of activation
    #[serde(rename = "auto-initialize", default = "default_true")]
    pub auto_initialize: bool,

    /// Informational for the host UI layer; the coordinator does not read it
    #[serde(rename = "use-built-in-ui", default = "default_true")]
    pub use_built_in_ui: bool,

    /// Keep the coordinator alive across stage loads
    #[serde(rename = "persist-across-scenes", default = "default_true")]
    pub persist_across_scenes: bool,

    /// Render a debug snapshot on every tick
    #[serde(rename = "show-debug-overlay", default)]
    pub show_debug_overlay: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        debug!("CoordinatorConfig::default: called");
        Self {
            auto_initialize: true,
            use_built_in_ui: true,
            persist_across_scenes: true,
            show_debug_overlay: false,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_auto_initialize(mut self, enabled: bool) -> Self {
        self.auto_initialize = enabled;
        self
    }

    pub fn with_persist_across_scenes(mut self, enabled: bool) -> Self {
        self.persist_across_scenes = enabled;
        self
    }

    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.show_debug_overlay = enabled;
        self
    }
}
