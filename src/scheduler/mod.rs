//! Host timer scheduler
//!
//! One-shot timers driven by the host tick. Used for the coordinator's
//! delayed gameplay-start transition.

mod config;
mod core;
mod queue;

pub use config::SchedulerConfig;
pub use core::TimerScheduler;
pub use queue::{ScheduledTimer, TimerCallback, TimerId, TimerStats};
