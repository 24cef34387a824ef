//! Match coordinator
//!
//! The single long-lived object that bridges the SDK facade to the game:
//! - **Lifecycle:** claims the registry slot or is rejected as a duplicate
//! - **Bridge:** turns facade notifications into consumer events, plus the
//!   delayed gameplay-start
//! - **Monitor:** per-tick time updates and the optional debug overlay

mod bridge;
mod config;
mod core;
mod error;
mod monitor;

pub use bridge::GAMEPLAY_START_DELAY;
pub use config::CoordinatorConfig;
pub use core::{Coordinator, EndPlayReason, LifecycleState};
pub use error::CoordinatorError;
pub use monitor::{DebugSnapshot, FacadeSummary, OverlayMode, TIME_UPDATE_INTERVAL};
