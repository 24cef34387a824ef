//! Timer scheduler configuration

use serde::{Deserialize, Serialize};

/// Timer scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max timers fired by a single `advance`; the rest wait for the next tick.
    /// Bounds callbacks that keep rescheduling themselves with zero delay.
    #[serde(rename = "max-fires-per-advance", default = "default_max_fires_per_advance")]
    pub max_fires_per_advance: usize,
}

fn default_max_fires_per_advance() -> usize {
    1024
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_fires_per_advance: default_max_fires_per_advance(),
        }
    }
}
