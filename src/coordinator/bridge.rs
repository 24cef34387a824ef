//! Event bridge: facade notifications to coordinator events

use tracing::{debug, error, info, warn};

use super::core::{Coordinator, PendingTransition};
use crate::domain::{MatchInfo, MatchResult, SdkError};
use crate::events::{ErrorOccurred, GameplayStart, MatchCompleted, MatchReady, SdkInitialized};
use crate::facade::FacadeNotification;

/// Delay between match-ready and gameplay-start, in seconds
pub const GAMEPLAY_START_DELAY: f32 = 0.5;

impl Coordinator {
    /// Initialize the SDK through the facade
    ///
    /// Safe to call repeatedly: refused once initialized, and ignored while a
    /// request is already waiting for the facade's answer.
    pub fn initialize(&self) {
        debug!(name = %self.name, "Coordinator::initialize: called");

        if self.initialized.get() {
            warn!(name = %self.name, "Coordinator already initialized");
            return;
        }

        if self.init_in_flight.get() {
            debug!(name = %self.name, "Coordinator::initialize: request already pending");
            return;
        }

        let Some(facade) = self.facade() else {
            error!(name = %self.name, "Cannot initialize, SDK facade not available");
            return;
        };

        if facade.is_ready() {
            self.initialized.set(true);
            info!(name = %self.name, "SDK already ready");
            self.emit(SdkInitialized {
                success: true,
                error: SdkError::none(),
            });
            return;
        }

        info!(name = %self.name, "Initializing SDK");
        self.init_in_flight.set(true);
        facade.request_initialize();
    }

    /// Drain queued facade notifications and bridge each one, in arrival order
    ///
    /// Returns how many notifications were handled.
    pub fn pump_notifications(&self) -> usize {
        if !self.is_active() {
            return 0;
        }

        let drained: Vec<FacadeNotification> = {
            let mut notifications = self.notifications.borrow_mut();
            let Some(rx) = notifications.as_mut() else {
                return 0;
            };
            let mut drained = Vec::new();
            while let Ok(notification) = rx.try_recv() {
                drained.push(notification);
            }
            drained
        };

        let mut handled = 0;
        for notification in drained {
            // A listener may have torn the coordinator down mid-batch
            if !self.is_active() {
                debug!(name = %self.name, "Coordinator::pump_notifications: torn down, dropping rest");
                break;
            }
            self.handle_notification(notification);
            handled += 1;
        }
        handled
    }

    fn handle_notification(&self, notification: FacadeNotification) {
        debug!(name = %self.name, kind = notification.kind(), "Coordinator::handle_notification: called");
        match notification {
            FacadeNotification::Initialized { success, error } => self.on_initialized(success, error),
            FacadeNotification::MatchStarted { info, error } => self.on_match_started(info, error),
            FacadeNotification::MatchCompleted { result, error } => self.on_match_completed(result, error),
            FacadeNotification::Error { error } => self.on_error(error),
        }
    }

    fn on_initialized(&self, success: bool, error: SdkError) {
        self.initialized.set(success);
        self.init_in_flight.set(false);

        if success {
            info!(name = %self.name, "SDK initialization succeeded");
        } else {
            warn!(name = %self.name, %error, "SDK initialization failed");
        }

        self.emit(SdkInitialized {
            success,
            error: error.clone(),
        });

        if !success {
            self.emit(ErrorOccurred { error });
        }
    }

    fn on_match_started(&self, info: MatchInfo, error: SdkError) {
        info!(name = %self.name, match_id = %info.match_id, "Match started: {}", info.versus());

        self.emit(MatchReady {
            info: info.clone(),
            error,
        });
        self.schedule_gameplay_start(info);
    }

    fn on_match_completed(&self, result: MatchResult, error: SdkError) {
        info!(
            name = %self.name,
            match_id = %result.match_id,
            "Match completed: {} (Score: {})",
            result.outcome,
            result.player_score
        );
        self.emit(MatchCompleted { result, error });
    }

    fn on_error(&self, error: SdkError) {
        error!(name = %self.name, %error, "SDK error");
        self.emit(ErrorOccurred { error });
    }

    /// Schedule gameplay-start for this match after the fixed delay
    ///
    /// Every call schedules its own transition; earlier ones are left running.
    fn schedule_gameplay_start(&self, info: MatchInfo) {
        if !self.is_active() {
            return;
        }

        let Some(timers) = self.timers.borrow().clone() else {
            warn!(name = %self.name, "Coordinator::schedule_gameplay_start: no timer scheduler bound");
            return;
        };

        let seq = self.next_transition.get();
        self.next_transition.set(seq + 1);

        // Only the match info and a weak handle go into the timer
        let weak = self.self_ref.clone();
        let timer = timers.schedule_once(GAMEPLAY_START_DELAY, move || match weak.upgrade() {
            Some(coordinator) => coordinator.fire_gameplay_start(seq, info),
            None => debug!(seq, "gameplay start: coordinator dropped, skipping"),
        });

        self.pending.borrow_mut().push(PendingTransition { seq, timer });
        debug!(name = %self.name, seq, %timer, pending = self.pending_transitions(), "Coordinator::schedule_gameplay_start: scheduled");
    }

    fn fire_gameplay_start(&self, seq: u64, info: MatchInfo) {
        self.pending.borrow_mut().retain(|t| t.seq != seq);

        if !self.is_active() {
            debug!(name = %self.name, seq, "Coordinator::fire_gameplay_start: not active, skipping");
            return;
        }

        info!(name = %self.name, match_id = %info.match_id, "Gameplay start");
        self.emit(GameplayStart { info });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::coordinator::{CoordinatorConfig, EndPlayReason};
    use crate::domain::{ErrorKind, PlayerInfo};
    use crate::events::CoordinatorEvent;
    use crate::facade::{InitPolicy, ScriptedFacade};
    use crate::host::{Host, HostContext};

    fn setup(policy: InitPolicy) -> (Host, Rc<ScriptedFacade>, Rc<Coordinator>, Rc<RefCell<Vec<CoordinatorEvent>>>) {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::new());
        facade.set_init_policy(policy);
        host.register_facade(facade.clone());

        let coordinator = host.spawn("test", CoordinatorConfig::default().with_auto_initialize(false));
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        coordinator.events().on_any(move |e| l.borrow_mut().push(e.clone()));
        (host, facade, coordinator, log)
    }

    fn types(log: &Rc<RefCell<Vec<CoordinatorEvent>>>) -> Vec<&'static str> {
        log.borrow().iter().map(|e| e.event_type()).collect()
    }

    fn alice_vs_bob() -> MatchInfo {
        MatchInfo::new("m-1", PlayerInfo::new("p1", "Alice"), PlayerInfo::new("p2", "Bob"))
    }

    #[test]
    fn test_initialize_async_success() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Succeed);

        coordinator.initialize();
        assert_eq!(facade.init_requests(), 1);
        // Nothing until the notification is pumped
        assert!(log.borrow().is_empty());

        host.tick(0.016);
        assert!(coordinator.is_initialized());
        assert_eq!(types(&log), vec!["Initialized"]);
    }

    #[test]
    fn test_initialize_when_already_ready() {
        let (_host, facade, coordinator, log) = setup(InitPolicy::Succeed);
        facade.set_ready(true);

        coordinator.initialize();
        assert_eq!(facade.init_requests(), 0);
        assert!(coordinator.is_initialized());
        assert_eq!(
            *log.borrow(),
            vec![CoordinatorEvent::Initialized(SdkInitialized {
                success: true,
                error: SdkError::none()
            })]
        );

        // Refused once initialized
        coordinator.initialize();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_initialize_twice_back_to_back() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Succeed);

        coordinator.initialize();
        coordinator.initialize();
        host.tick(0.016);

        assert_eq!(facade.init_requests(), 1);
        assert_eq!(types(&log), vec!["Initialized"]);
    }

    #[test]
    fn test_initialize_failure_raises_error_too() {
        let error = SdkError::new(ErrorKind::Authentication, "bad token");
        let (host, _facade, coordinator, log) = setup(InitPolicy::Fail(error.clone()));

        coordinator.initialize();
        host.tick(0.016);

        assert!(!coordinator.is_initialized());
        assert_eq!(
            *log.borrow(),
            vec![
                CoordinatorEvent::Initialized(SdkInitialized {
                    success: false,
                    error: error.clone()
                }),
                CoordinatorEvent::ErrorOccurred(ErrorOccurred { error }),
            ]
        );
    }

    #[test]
    fn test_retry_after_failure() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Fail(SdkError::message("down")));

        coordinator.initialize();
        host.tick(0.016);
        assert!(!coordinator.is_initialized());

        facade.set_init_policy(InitPolicy::Succeed);
        coordinator.initialize();
        host.tick(0.016);

        assert!(coordinator.is_initialized());
        assert_eq!(types(&log), vec!["Initialized", "ErrorOccurred", "Initialized"]);
    }

    #[test]
    fn test_initialize_without_facade_is_silent() {
        let host = Host::default();
        let coordinator = host.spawn("test", CoordinatorConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        coordinator.events().on_any(move |e| l.borrow_mut().push(e.clone()));

        coordinator.initialize();
        host.tick(0.016);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_match_ready_then_gameplay_start() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Succeed);

        facade.start_match(alice_vs_bob());
        host.tick(0.1);
        assert_eq!(types(&log), vec!["MatchReady"]);
        assert_eq!(coordinator.pending_transitions(), 1);

        for _ in 0..4 {
            host.tick(0.1);
        }
        assert_eq!(types(&log), vec!["MatchReady"]);

        host.tick(0.1);
        assert_eq!(types(&log), vec!["MatchReady", "GameplayStart"]);
        assert_eq!(coordinator.pending_transitions(), 0);

        match &log.borrow()[1] {
            CoordinatorEvent::GameplayStart(e) => assert_eq!(e.info, alice_vs_bob()),
            other => panic!("Expected GameplayStart, got {:?}", other),
        }
    }

    #[test]
    fn test_overlapping_transitions_both_fire() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Succeed);

        facade.start_match(alice_vs_bob());
        host.tick(0.25);
        facade.start_match(alice_vs_bob());
        host.tick(0.25);
        assert_eq!(coordinator.pending_transitions(), 2);

        host.tick(0.25);
        host.tick(0.25);
        assert_eq!(types(&log), vec!["MatchReady", "MatchReady", "GameplayStart", "GameplayStart"]);
    }

    #[test]
    fn test_teardown_cancels_gameplay_start() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Succeed);

        facade.start_match(alice_vs_bob());
        host.tick(0.1);
        coordinator.end_play(host.registry(), EndPlayReason::Destroyed);

        for _ in 0..10 {
            host.tick(0.1);
        }
        assert_eq!(types(&log), vec!["MatchReady"]);
        assert_eq!(coordinator.pending_transitions(), 0);
    }

    #[test]
    fn test_dropped_coordinator_timer_is_skipped() {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::new());
        host.register_facade(facade.clone());

        // Not placed in the stage, so the registry slot is the only other owner
        let coordinator = Coordinator::new("loose", CoordinatorConfig::default().with_auto_initialize(false));
        coordinator.begin_play(&host);
        facade.start_match(alice_vs_bob());
        coordinator.pump_notifications();

        let timers = host.timers();
        assert_eq!(timers.pending(), 1);

        // Drop every strong reference without going through end_play
        assert!(host.registry().release(&coordinator));
        drop(coordinator);

        host.tick(1.0);
        assert_eq!(timers.pending(), 0);
        assert_eq!(timers.stats().total_fired, 1);
    }

    #[test]
    fn test_standalone_error_keeps_state() {
        let (host, facade, coordinator, log) = setup(InitPolicy::Succeed);
        coordinator.initialize();
        host.tick(0.016);

        facade.report_error(SdkError::new(ErrorKind::Network, "lost connection"));
        host.tick(0.016);

        assert!(coordinator.is_initialized());
        assert_eq!(types(&log), vec!["Initialized", "ErrorOccurred"]);
    }

    #[test]
    fn test_match_completed_forwarded() {
        let (host, facade, _coordinator, log) = setup(InitPolicy::Succeed);

        facade.complete_match(MatchResult::scored("m-1", 1200, 900));
        host.tick(0.016);

        match &log.borrow()[0] {
            CoordinatorEvent::MatchCompleted(e) => {
                assert_eq!(e.result.player_score, 1200);
                assert!(e.result.is_win());
                assert!(e.error.is_none());
            }
            other => panic!("Expected MatchCompleted, got {:?}", other),
        }
    }

    #[test]
    fn test_pump_on_duplicate_is_noop() {
        let (host, facade, _coordinator, _log) = setup(InitPolicy::Succeed);
        let duplicate = host.spawn("dup", CoordinatorConfig::default());
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        duplicate.events().on_any(move |_| *h.borrow_mut() += 1);

        facade.report_error(SdkError::message("boom"));
        host.tick(0.016);

        assert_eq!(duplicate.pump_notifications(), 0);
        assert_eq!(*hits.borrow(), 0);
    }
}
