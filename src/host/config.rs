//! Host runtime configuration

use serde::{Deserialize, Serialize};

use crate::facade::SDK_SERVICE_KEY;
use crate::scheduler::SchedulerConfig;

/// Host runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Ticks per second when the host drives itself
    #[serde(rename = "tick-rate-hz")]
    pub tick_rate_hz: u32,

    /// Subsystem key the SDK facade is registered under
    #[serde(rename = "sdk-service-key")]
    pub sdk_service_key: String,

    /// Timer scheduler limits
    pub scheduler: SchedulerConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            sdk_service_key: SDK_SERVICE_KEY.to_string(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl HostConfig {
    /// Seconds per tick; zero if the rate is zero
    pub fn tick_interval(&self) -> f32 {
        if self.tick_rate_hz == 0 {
            return 0.0;
        }
        1.0 / self.tick_rate_hz as f32
    }
}
