//! Coordinator error types

use thiserror::Error;

use super::core::LifecycleState;

/// Errors returned by coordinator operations
///
/// Facade failures are never reported here; they travel as events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("Configuration is locked once the coordinator has begun play (state: {state})")]
    ConfigLocked { state: LifecycleState },
}
