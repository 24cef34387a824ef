//! Coordinator entity and lifecycle

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::CoordinatorConfig;
use super::error::CoordinatorError;
use crate::domain::MatchInfo;
use crate::events::{CoordinatorEvent, EventHub};
use crate::facade::{NotificationReceiver, SdkFacade};
use crate::host::{HostContext, OverlayRenderer};
use crate::registry::CoordinatorRegistry;
use crate::scheduler::{TimerId, TimerScheduler};

/// Lifecycle of a coordinator
///
/// `Unregistered -> Active -> TornDown`, or `Unregistered -> RejectedDuplicate`.
/// Both `TornDown` and `RejectedDuplicate` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Unregistered,
    Active,
    TornDown,
    RejectedDuplicate,
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TornDown | Self::RejectedDuplicate)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unregistered => write!(f, "unregistered"),
            Self::Active => write!(f, "active"),
            Self::TornDown => write!(f, "torn-down"),
            Self::RejectedDuplicate => write!(f, "rejected-duplicate"),
        }
    }
}

/// Why a coordinator is leaving play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndPlayReason {
    /// Removed explicitly by the host
    Destroyed,
    /// The stage it lived in was unloaded
    StageUnloaded,
    /// The host is shutting down
    Quit,
}

/// An outstanding delayed gameplay-start
#[derive(Debug, Clone, Copy)]
pub(super) struct PendingTransition {
    pub(super) seq: u64,
    pub(super) timer: TimerId,
}

/// The match coordinator
///
/// Bridges facade notifications to consumer events. Always handled through
/// `Rc`; the coordinator keeps a weak reference to itself so deferred work can
/// check liveness without extending its lifetime.
pub struct Coordinator {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) self_ref: Weak<Coordinator>,
    pub(super) config: Cell<CoordinatorConfig>,
    pub(super) state: Cell<LifecycleState>,
    pub(super) initialized: Cell<bool>,
    pub(super) init_in_flight: Cell<bool>,
    pub(super) facade: RefCell<Option<Weak<dyn SdkFacade>>>,
    pub(super) notifications: RefCell<Option<NotificationReceiver>>,
    pub(super) timers: RefCell<Option<Rc<TimerScheduler>>>,
    pub(super) overlay: RefCell<Option<Rc<dyn OverlayRenderer>>>,
    pub(super) pending: RefCell<Vec<PendingTransition>>,
    pub(super) next_transition: Cell<u64>,
    pub(super) match_time_accumulator: Cell<f32>,
    pub(super) events: EventHub,
}

impl Coordinator {
    /// Create an unregistered coordinator
    pub fn new(name: impl Into<String>, config: CoordinatorConfig) -> Rc<Self> {
        let name = name.into();
        let id = Uuid::now_v7();
        debug!(%name, %id, ?config, "Coordinator::new: called");
        Rc::new_cyclic(|self_ref| Self {
            id,
            name,
            self_ref: self_ref.clone(),
            config: Cell::new(config),
            state: Cell::new(LifecycleState::Unregistered),
            initialized: Cell::new(false),
            init_in_flight: Cell::new(false),
            facade: RefCell::new(None),
            notifications: RefCell::new(None),
            timers: RefCell::new(None),
            overlay: RefCell::new(None),
            pending: RefCell::new(Vec::new()),
            next_transition: Cell::new(1),
            match_time_accumulator: Cell::new(0.0),
            events: EventHub::new(),
        })
    }

    // === Lifecycle ===

    /// Activation attempt
    ///
    /// Claims the registry slot, or becomes a rejected duplicate if another
    /// coordinator holds it. An active coordinator then resolves its facade,
    /// binds notifications and, when configured, initializes.
    pub fn begin_play(self: &Rc<Self>, ctx: &dyn HostContext) {
        debug!(name = %self.name, state = %self.state.get(), "Coordinator::begin_play: called");

        if self.state.get() != LifecycleState::Unregistered {
            warn!(name = %self.name, state = %self.state.get(), "Coordinator::begin_play: already began play");
            return;
        }

        if !ctx.registry().claim(self) {
            warn!(name = %self.name, "Multiple coordinators detected, destroying duplicate");
            self.state.set(LifecycleState::RejectedDuplicate);
            self.release_bindings();
            return;
        }

        self.state.set(LifecycleState::Active);
        *self.timers.borrow_mut() = Some(ctx.timers());
        *self.overlay.borrow_mut() = ctx.overlay();

        let config = self.config.get();
        let key = ctx.sdk_service_key().to_string();
        match ctx.resolve_facade(&key) {
            Some(facade) => {
                self.bind_facade(&facade);
                if config.auto_initialize {
                    self.initialize();
                }
            }
            None => {
                error!(name = %self.name, %key, "Coordinator::begin_play: could not resolve SDK facade");
            }
        }

        info!(
            name = %self.name,
            auto_initialize = config.auto_initialize,
            use_built_in_ui = config.use_built_in_ui,
            "Coordinator began play"
        );
    }

    /// Removal from the running stage
    ///
    /// Clears the registry slot if this coordinator holds it. Any outstanding
    /// work is dropped and no further events are raised.
    pub fn end_play(&self, registry: &CoordinatorRegistry, reason: EndPlayReason) {
        debug!(name = %self.name, state = %self.state.get(), ?reason, "Coordinator::end_play: called");

        let released = registry.release(self);
        match self.state.get() {
            LifecycleState::Active | LifecycleState::Unregistered => {
                self.state.set(LifecycleState::TornDown);
            }
            LifecycleState::TornDown | LifecycleState::RejectedDuplicate => {}
        }

        self.release_bindings();
        if released {
            info!(name = %self.name, ?reason, "Coordinator torn down");
        }
    }

    /// Drop listeners, the facade binding and outstanding transitions
    fn release_bindings(&self) {
        self.events.clear();
        self.notifications.borrow_mut().take();
        self.facade.borrow_mut().take();
        self.overlay.borrow_mut().take();
        self.match_time_accumulator.set(0.0);

        let pending: Vec<PendingTransition> = self.pending.borrow_mut().drain(..).collect();
        let timers = self.timers.borrow_mut().take();
        if let Some(timers) = timers {
            for transition in pending {
                timers.cancel(transition.timer);
            }
        }
    }

    fn bind_facade(&self, facade: &Rc<dyn SdkFacade>) {
        debug!(name = %self.name, version = %facade.version(), "Coordinator::bind_facade: called");
        *self.notifications.borrow_mut() = Some(facade.subscribe());
        *self.facade.borrow_mut() = Some(Rc::downgrade(facade));
    }

    // === Configuration ===

    pub fn config(&self) -> CoordinatorConfig {
        self.config.get()
    }

    /// Replace the configuration; only allowed before the coordinator begins play
    pub fn configure(&self, config: CoordinatorConfig) -> Result<(), CoordinatorError> {
        let state = self.state.get();
        if state != LifecycleState::Unregistered {
            return Err(CoordinatorError::ConfigLocked { state });
        }
        debug!(name = %self.name, ?config, "Coordinator::configure: called");
        self.config.set(config);
        Ok(())
    }

    /// Whether the host should carry this coordinator across stage loads
    pub fn persists(&self) -> bool {
        self.config.get().persist_across_scenes
    }

    // === Queries ===

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.state.get() == LifecycleState::Active
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Whether a facade is resolved and still alive
    pub fn has_facade(&self) -> bool {
        self.facade().is_some()
    }

    /// Facade readiness, false when no facade is bound
    pub fn is_ready(&self) -> bool {
        self.facade().is_some_and(|f| f.is_ready())
    }

    /// Facade match state, false when no facade is bound
    pub fn is_in_match(&self) -> bool {
        self.facade().is_some_and(|f| f.is_in_match())
    }

    /// Current match, or the empty value when no facade is bound
    pub fn match_info(&self) -> MatchInfo {
        self.facade().map(|f| f.current_match()).unwrap_or_default()
    }

    /// Number of gameplay-start transitions waiting on the timer
    pub fn pending_transitions(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Consumer event surface
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub(super) fn facade(&self) -> Option<Rc<dyn SdkFacade>> {
        self.facade.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Raise an event if this coordinator is still active
    pub(super) fn emit(&self, event: impl Into<CoordinatorEvent>) {
        let event = event.into();
        if !self.is_active() {
            debug!(name = %self.name, event_type = event.event_type(), "Coordinator::emit: suppressed, not active");
            return;
        }
        self.events.emit(event);
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("initialized", &self.initialized.get())
            .field("config", &self.config.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::{InitPolicy, ScriptedFacade};
    use crate::host::Host;

    #[test]
    fn test_new_is_unregistered() {
        let coordinator = Coordinator::new("test", CoordinatorConfig::default());
        assert_eq!(coordinator.state(), LifecycleState::Unregistered);
        assert!(!coordinator.is_initialized());
        assert!(!coordinator.has_facade());
        assert!(!coordinator.is_ready());
        assert!(coordinator.match_info().is_empty());
    }

    #[test]
    fn test_begin_play_activates_and_initializes() {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::new());
        host.register_facade(facade.clone());

        let coordinator = host.spawn("main", CoordinatorConfig::default());
        assert!(coordinator.is_active());
        assert!(coordinator.has_facade());
        assert_eq!(facade.init_requests(), 1);
        assert!(host.registry().is_active());
    }

    #[test]
    fn test_begin_play_without_facade_stays_active() {
        let host = Host::default();
        let coordinator = host.spawn("main", CoordinatorConfig::default());

        assert!(coordinator.is_active());
        assert!(!coordinator.has_facade());
        assert!(!coordinator.is_initialized());
    }

    #[test]
    fn test_auto_initialize_off() {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::new());
        host.register_facade(facade.clone());

        host.spawn("main", CoordinatorConfig::default().with_auto_initialize(false));
        assert_eq!(facade.init_requests(), 0);
    }

    #[test]
    fn test_duplicate_rejected() {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::new());
        facade.set_init_policy(InitPolicy::Manual);
        host.register_facade(facade.clone());

        let first = host.spawn("first", CoordinatorConfig::default());
        let second = host.spawn("second", CoordinatorConfig::default());

        assert!(first.is_active());
        assert_eq!(second.state(), LifecycleState::RejectedDuplicate);
        assert!(!second.has_facade());
        // Only the active coordinator subscribed and asked for init
        assert_eq!(facade.subscriber_count(), 1);
        assert_eq!(facade.init_requests(), 1);
    }

    #[test]
    fn test_end_play_clears_slot() {
        let host = Host::default();
        let coordinator = host.spawn("main", CoordinatorConfig::default());

        coordinator.end_play(host.registry(), EndPlayReason::Destroyed);
        assert_eq!(coordinator.state(), LifecycleState::TornDown);
        assert!(!host.registry().is_active());
        assert!(host.registry().get().is_none());
    }

    #[test]
    fn test_end_play_of_duplicate_keeps_slot() {
        let host = Host::default();
        let first = host.spawn("first", CoordinatorConfig::default());
        let second = host.spawn("second", CoordinatorConfig::default());

        second.end_play(host.registry(), EndPlayReason::Destroyed);
        assert_eq!(second.state(), LifecycleState::RejectedDuplicate);
        assert!(Rc::ptr_eq(&host.registry().get().unwrap(), &first));
    }

    #[test]
    fn test_configure_locked_after_begin_play() {
        let host = Host::default();
        let coordinator = Coordinator::new("main", CoordinatorConfig::default());

        let config = CoordinatorConfig::default().with_debug_overlay(true);
        assert!(coordinator.configure(config).is_ok());
        assert!(coordinator.config().show_debug_overlay);

        coordinator.begin_play(&host);
        assert_eq!(
            coordinator.configure(CoordinatorConfig::default()),
            Err(CoordinatorError::ConfigLocked {
                state: LifecycleState::Active
            })
        );
    }

    #[test]
    fn test_begin_play_twice_is_noop() {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::new());
        facade.set_init_policy(InitPolicy::Manual);
        host.register_facade(facade.clone());

        let coordinator = host.spawn("main", CoordinatorConfig::default());
        coordinator.begin_play(&host);

        assert!(coordinator.is_active());
        assert_eq!(facade.subscriber_count(), 1);
    }

    #[test]
    fn test_lifecycle_state_display() {
        assert_eq!(LifecycleState::RejectedDuplicate.to_string(), "rejected-duplicate");
        assert!(LifecycleState::TornDown.is_terminal());
        assert!(!LifecycleState::Active.is_terminal());
    }
}
