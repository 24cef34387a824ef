//! Per-frame monitor: time updates and the debug overlay

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::core::Coordinator;
use crate::events::TimeUpdate;

/// Seconds of match time between time updates
pub const TIME_UPDATE_INTERVAL: f32 = 1.0;

/// Slack when comparing the accumulator against the interval, so deltas that
/// sum to a whole second in float arithmetic still cross it
const ACCUMULATOR_EPSILON: f32 = 1e-4;

/// What the facade is doing, as shown on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum OverlayMode {
    Idle,
    InMatch { elapsed_secs: f32, score: i64 },
    Practice,
    Matchmaking,
}

/// Read-only summary rendered by the debug overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub version: String,
    /// `None` when no facade is bound
    pub facade: Option<FacadeSummary>,
}

/// Facade flags shown on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacadeSummary {
    pub ready: bool,
    pub authenticated: bool,
    pub mode: OverlayMode,
}

impl std::fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MatchBridge SDK v{}", self.version)?;

        let Some(summary) = &self.facade else {
            return Ok(());
        };

        writeln!(f, "State: {}", if summary.ready { "Ready" } else { "Not Ready" })?;
        writeln!(f, "Authenticated: {}", if summary.authenticated { "Yes" } else { "No" })?;
        match summary.mode {
            OverlayMode::InMatch { elapsed_secs, score } => {
                writeln!(f, "In Match: Yes")?;
                writeln!(f, "Time: {:.1}s / Score: {}", elapsed_secs, score)
            }
            OverlayMode::Practice => writeln!(f, "Mode: Practice"),
            OverlayMode::Matchmaking => writeln!(f, "Status: Matchmaking..."),
            OverlayMode::Idle => Ok(()),
        }
    }
}

impl Coordinator {
    /// Run once per host tick
    ///
    /// Bridges queued facade notifications, then raises a time update for
    /// every full second of match time and renders the overlay if enabled.
    pub fn tick(&self, delta_secs: f32) {
        if !self.is_active() {
            return;
        }

        self.pump_notifications();
        self.update_match_clock(delta_secs);

        if self.config.get().show_debug_overlay {
            let overlay = self.overlay.borrow().clone();
            if let Some(overlay) = overlay {
                overlay.render(&self.debug_snapshot());
            }
        }
    }

    /// One time update for every whole second of match time crossed. Time past
    /// the last threshold carries over, so the count depends only on the total
    /// match time, not on how it was split into ticks.
    fn update_match_clock(&self, delta_secs: f32) {
        let Some(facade) = self.facade() else {
            return;
        };

        if !facade.is_in_match() {
            self.match_time_accumulator.set(0.0);
            return;
        }

        let mut accumulated = self.match_time_accumulator.get() + delta_secs.max(0.0);
        let mut crossed = 0u32;
        while accumulated + ACCUMULATOR_EPSILON >= TIME_UPDATE_INTERVAL {
            accumulated = (accumulated - TIME_UPDATE_INTERVAL).max(0.0);
            crossed += 1;
        }
        self.match_time_accumulator.set(accumulated);

        if crossed > 1 {
            debug!(name = %self.name, crossed, delta_secs, "Coordinator::update_match_clock: long tick");
        }

        for _ in 0..crossed {
            // A listener may have torn the coordinator down
            if !self.is_active() {
                break;
            }
            self.emit(TimeUpdate {
                remaining_secs: facade.remaining_time(),
                elapsed_secs: facade.elapsed_time(),
            });
        }
    }

    /// Current overlay contents
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let Some(facade) = self.facade() else {
            return DebugSnapshot {
                version: env!("CARGO_PKG_VERSION").to_string(),
                facade: None,
            };
        };

        let mode = if facade.is_in_match() {
            OverlayMode::InMatch {
                elapsed_secs: facade.elapsed_time(),
                score: facade.current_score(),
            }
        } else if facade.is_in_practice() {
            OverlayMode::Practice
        } else if facade.is_in_matchmaking() {
            OverlayMode::Matchmaking
        } else {
            OverlayMode::Idle
        };

        let snapshot = DebugSnapshot {
            version: facade.version(),
            facade: Some(FacadeSummary {
                ready: facade.is_ready(),
                authenticated: facade.is_authenticated(),
                mode,
            }),
        };
        debug!(?snapshot, "Coordinator::debug_snapshot: called");
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::coordinator::CoordinatorConfig;
    use crate::domain::{MatchInfo, PlayerInfo};
    use crate::facade::{FacadeMode, ScriptedFacade};
    use crate::host::{Host, HostContext, OverlayRenderer};

    fn setup() -> (Host, Rc<ScriptedFacade>, Rc<Coordinator>, Rc<RefCell<Vec<TimeUpdate>>>) {
        let host = Host::default();
        let facade = Rc::new(ScriptedFacade::with_version("1.2.3"));
        host.register_facade(facade.clone());
        let coordinator = host.spawn("test", CoordinatorConfig::default().with_auto_initialize(false));

        let updates = Rc::new(RefCell::new(Vec::new()));
        let u = updates.clone();
        coordinator.events().on_time_update(move |e| u.borrow_mut().push(*e));
        (host, facade, coordinator, updates)
    }

    fn timed_match() -> MatchInfo {
        MatchInfo::new("m-1", PlayerInfo::new("p1", "Alice"), PlayerInfo::new("p2", "Bob")).with_duration(60.0)
    }

    #[test]
    fn test_no_updates_outside_match() {
        let (_host, _facade, coordinator, updates) = setup();
        for _ in 0..10 {
            coordinator.tick(0.5);
        }
        assert!(updates.borrow().is_empty());
    }

    #[test]
    fn test_one_update_per_second() {
        let (_host, facade, coordinator, updates) = setup();
        facade.start_match(timed_match());

        for _ in 0..8 {
            facade.advance(0.25);
            coordinator.tick(0.25);
        }

        assert_eq!(updates.borrow().len(), 2);
        let first = updates.borrow()[0];
        assert_eq!(first.elapsed_secs, 1.0);
        assert_eq!(first.remaining_secs, 59.0);
    }

    #[test]
    fn test_cadence_with_uneven_ticks() {
        let (_host, facade, coordinator, updates) = setup();
        facade.start_match(timed_match());

        for _ in 0..7 {
            coordinator.tick(0.4);
        }
        coordinator.tick(0.2);

        assert_eq!(updates.borrow().len(), 3);
    }

    #[test]
    fn test_large_delta_raises_per_second() {
        let (_host, facade, coordinator, updates) = setup();
        facade.start_match(timed_match());

        coordinator.tick(3.5);
        assert_eq!(updates.borrow().len(), 3);

        // Half a second carried over
        coordinator.tick(0.5);
        assert_eq!(updates.borrow().len(), 4);
    }

    #[test]
    fn test_ticks_longer_than_a_second() {
        let (_host, facade, coordinator, updates) = setup();
        facade.start_match(timed_match());

        coordinator.tick(1.5);
        coordinator.tick(1.5);
        assert_eq!(updates.borrow().len(), 3);
    }

    #[test]
    fn test_accumulator_resets_between_matches() {
        let (_host, facade, coordinator, updates) = setup();
        facade.start_match(timed_match());
        coordinator.tick(0.9);

        facade.set_mode(FacadeMode::Idle);
        coordinator.tick(0.1);

        facade.start_match(timed_match());
        coordinator.tick(0.5);
        assert!(updates.borrow().is_empty());
    }

    #[test]
    fn test_snapshot_formats() {
        let (_host, facade, coordinator, _updates) = setup();

        assert_eq!(
            coordinator.debug_snapshot().to_string(),
            "MatchBridge SDK v1.2.3\nState: Not Ready\nAuthenticated: No\n"
        );

        facade.set_ready(true);
        facade.set_authenticated(true);
        facade.set_mode(FacadeMode::Practice);
        assert!(coordinator.debug_snapshot().to_string().ends_with("Mode: Practice\n"));

        facade.set_mode(FacadeMode::Matchmaking);
        assert!(
            coordinator
                .debug_snapshot()
                .to_string()
                .ends_with("Status: Matchmaking...\n")
        );

        facade.start_match(timed_match());
        facade.advance(12.34);
        facade.set_score(420);
        assert_eq!(
            coordinator.debug_snapshot().to_string(),
            "MatchBridge SDK v1.2.3\nState: Ready\nAuthenticated: Yes\nIn Match: Yes\nTime: 12.3s / Score: 420\n"
        );
    }

    #[test]
    fn test_snapshot_without_facade() {
        let coordinator = Coordinator::new("loose", CoordinatorConfig::default());
        let snapshot = coordinator.debug_snapshot();
        assert!(snapshot.facade.is_none());
        assert_eq!(snapshot.to_string().lines().count(), 1);
    }

    struct Recorder(RefCell<Vec<String>>);

    impl OverlayRenderer for Recorder {
        fn render(&self, snapshot: &DebugSnapshot) {
            self.0.borrow_mut().push(snapshot.to_string());
        }
    }

    #[test]
    fn test_overlay_rendered_only_when_enabled() {
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let host = Host::default().with_overlay(recorder.clone());
        host.register_facade(Rc::new(ScriptedFacade::new()));

        let quiet = host.spawn("quiet", CoordinatorConfig::default());
        quiet.tick(0.1);
        assert!(recorder.0.borrow().is_empty());
        quiet.end_play(host.registry(), crate::coordinator::EndPlayReason::Destroyed);

        let loud = host.spawn("loud", CoordinatorConfig::default().with_debug_overlay(true));
        loud.tick(0.1);
        loud.tick(0.1);
        assert_eq!(recorder.0.borrow().len(), 2);
    }
}
