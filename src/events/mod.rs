//! Coordinator event surface
//!
//! Consumers subscribe listeners per event type on the [`EventHub`]. Events
//! can also be persisted as JSONL through [`EventLogger`].

mod channel;
mod hub;
mod logger;
mod types;

pub use channel::{EventChannel, Listener, ListenerId};
pub use hub::EventHub;
pub use logger::{EventLogger, read_event_log};
pub use types::{
    CoordinatorEvent, ErrorOccurred, EventLogEntry, GameplayStart, MatchCompleted, MatchReady, SdkInitialized,
    TimeUpdate,
};
