//! EventHub - the coordinator's consumer-facing event surface

use tracing::debug;

use super::channel::{EventChannel, ListenerId};
use super::types::{CoordinatorEvent, ErrorOccurred, GameplayStart, MatchCompleted, MatchReady, SdkInitialized, TimeUpdate};

/// Six typed channels plus an `any` channel that sees every event
///
/// Typed listeners run first, then `any` listeners, all in subscription
/// order.
#[derive(Debug)]
pub struct EventHub {
    initialized: EventChannel<SdkInitialized>,
    match_ready: EventChannel<MatchReady>,
    gameplay_start: EventChannel<GameplayStart>,
    match_completed: EventChannel<MatchCompleted>,
    error_occurred: EventChannel<ErrorOccurred>,
    time_update: EventChannel<TimeUpdate>,
    any: EventChannel<CoordinatorEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            initialized: EventChannel::new("Initialized"),
            match_ready: EventChannel::new("MatchReady"),
            gameplay_start: EventChannel::new("GameplayStart"),
            match_completed: EventChannel::new("MatchCompleted"),
            error_occurred: EventChannel::new("ErrorOccurred"),
            time_update: EventChannel::new("TimeUpdate"),
            any: EventChannel::new("any"),
        }
    }

    // === Subscription ===

    pub fn on_initialized(&self, listener: impl Fn(&SdkInitialized) + 'static) -> ListenerId {
        self.initialized.subscribe(listener)
    }

    pub fn on_match_ready(&self, listener: impl Fn(&MatchReady) + 'static) -> ListenerId {
        self.match_ready.subscribe(listener)
    }

    pub fn on_gameplay_start(&self, listener: impl Fn(&GameplayStart) + 'static) -> ListenerId {
        self.gameplay_start.subscribe(listener)
    }

    pub fn on_match_completed(&self, listener: impl Fn(&MatchCompleted) + 'static) -> ListenerId {
        self.match_completed.subscribe(listener)
    }

    pub fn on_error(&self, listener: impl Fn(&ErrorOccurred) + 'static) -> ListenerId {
        self.error_occurred.subscribe(listener)
    }

    pub fn on_time_update(&self, listener: impl Fn(&TimeUpdate) + 'static) -> ListenerId {
        self.time_update.subscribe(listener)
    }

    /// Receive every event, after the typed listeners
    pub fn on_any(&self, listener: impl Fn(&CoordinatorEvent) + 'static) -> ListenerId {
        self.any.subscribe(listener)
    }

    /// Remove a listener from whichever channel holds it
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.initialized.unsubscribe(id)
            || self.match_ready.unsubscribe(id)
            || self.gameplay_start.unsubscribe(id)
            || self.match_completed.unsubscribe(id)
            || self.error_occurred.unsubscribe(id)
            || self.time_update.unsubscribe(id)
            || self.any.unsubscribe(id)
    }

    // === Dispatch ===

    /// Raise an event on its typed channel and then on `any`
    pub fn emit(&self, event: CoordinatorEvent) {
        if !event.is_time_update() {
            debug!(event_type = event.event_type(), "EventHub::emit");
        }
        match &event {
            CoordinatorEvent::Initialized(e) => self.initialized.raise(e),
            CoordinatorEvent::MatchReady(e) => self.match_ready.raise(e),
            CoordinatorEvent::GameplayStart(e) => self.gameplay_start.raise(e),
            CoordinatorEvent::MatchCompleted(e) => self.match_completed.raise(e),
            CoordinatorEvent::ErrorOccurred(e) => self.error_occurred.raise(e),
            CoordinatorEvent::TimeUpdate(e) => self.time_update.raise(e),
        };
        self.any.raise(&event);
    }

    /// Total listeners across all channels
    pub fn listener_count(&self) -> usize {
        self.initialized.len()
            + self.match_ready.len()
            + self.gameplay_start.len()
            + self.match_completed.len()
            + self.error_occurred.len()
            + self.time_update.len()
            + self.any.len()
    }

    /// Drop every listener on every channel
    pub fn clear(&self) {
        debug!(listeners = self.listener_count(), "EventHub::clear: called");
        self.initialized.clear();
        self.match_ready.clear();
        self.gameplay_start.clear();
        self.match_completed.clear();
        self.error_occurred.clear();
        self.time_update.clear();
        self.any.clear();
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
