//! ScriptedFacade - in-process SDK stand-in for headless hosts and tests

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FacadeNotification, NotificationReceiver, NotificationSender, SdkFacade, notification_channel};
use crate::domain::{MatchInfo, MatchResult, SdkError};

/// What the facade is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FacadeMode {
    #[default]
    Idle,
    Practice,
    Matchmaking,
    InMatch,
}

/// How `request_initialize` is answered
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InitPolicy {
    /// Become ready and notify success
    #[default]
    Succeed,
    /// Notify failure with the given error
    Fail(SdkError),
    /// Record the request only; the driver calls `complete_initialization`
    Manual,
}

/// Scripted SDK facade
///
/// All state is set by the driver (a scenario, a test, the CLI). Notifications
/// are fanned out to every live subscriber in the order they are produced.
pub struct ScriptedFacade {
    version: String,
    ready: Cell<bool>,
    authenticated: Cell<bool>,
    mode: Cell<FacadeMode>,
    elapsed: Cell<f32>,
    duration: Cell<f32>,
    score: Cell<i64>,
    current: RefCell<MatchInfo>,
    init_policy: RefCell<InitPolicy>,
    init_requests: Cell<u32>,
    subscribers: RefCell<Vec<NotificationSender>>,
}

impl ScriptedFacade {
    /// Create a facade that is not ready yet and answers init requests with success
    pub fn new() -> Self {
        Self::with_version(env!("CARGO_PKG_VERSION"))
    }

    pub fn with_version(version: impl Into<String>) -> Self {
        let version = version.into();
        debug!(%version, "ScriptedFacade::new: called");
        Self {
            version,
            ready: Cell::new(false),
            authenticated: Cell::new(false),
            mode: Cell::new(FacadeMode::Idle),
            elapsed: Cell::new(0.0),
            duration: Cell::new(0.0),
            score: Cell::new(0),
            current: RefCell::new(MatchInfo::default()),
            init_policy: RefCell::new(InitPolicy::Succeed),
            init_requests: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    // === Driver controls ===

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.set(authenticated);
    }

    pub fn set_init_policy(&self, policy: InitPolicy) {
        *self.init_policy.borrow_mut() = policy;
    }

    pub fn set_mode(&self, mode: FacadeMode) {
        debug!(?mode, "ScriptedFacade::set_mode: called");
        self.mode.set(mode);
    }

    pub fn mode(&self) -> FacadeMode {
        self.mode.get()
    }

    pub fn set_score(&self, score: i64) {
        self.score.set(score);
    }

    /// Number of `request_initialize` calls received
    pub fn init_requests(&self) -> u32 {
        self.init_requests.get()
    }

    /// Number of subscribers whose receiver is still alive
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Deliver a notification to every subscriber
    pub fn notify(&self, notification: FacadeNotification) {
        debug!(kind = notification.kind(), "ScriptedFacade::notify: called");
        let mut subscribers = self.subscribers.borrow_mut();
        // Dropped receivers are pruned as they are found
        subscribers.retain(|tx| tx.send(notification.clone()).is_ok());
    }

    /// Finish a pending initialization
    pub fn complete_initialization(&self, success: bool, error: SdkError) {
        debug!(success, "ScriptedFacade::complete_initialization: called");
        self.ready.set(success);
        if success {
            self.authenticated.set(true);
        }
        self.notify(FacadeNotification::Initialized { success, error });
    }

    /// Enter a match and notify `MatchStarted`
    pub fn start_match(&self, info: MatchInfo) {
        debug!(match_id = %info.match_id, "ScriptedFacade::start_match: called");
        self.mode.set(FacadeMode::InMatch);
        self.elapsed.set(0.0);
        self.duration.set(info.duration_secs.max(0.0));
        self.score.set(0);
        *self.current.borrow_mut() = info.clone();
        self.notify(FacadeNotification::MatchStarted {
            info,
            error: SdkError::none(),
        });
    }

    /// Leave the match and notify `MatchCompleted`
    pub fn complete_match(&self, result: MatchResult) {
        debug!(match_id = %result.match_id, score = result.player_score, "ScriptedFacade::complete_match: called");
        self.mode.set(FacadeMode::Idle);
        self.score.set(result.player_score);
        self.notify(FacadeNotification::MatchCompleted {
            result,
            error: SdkError::none(),
        });
    }

    /// Notify a standalone error
    pub fn report_error(&self, error: SdkError) {
        self.notify(FacadeNotification::Error { error });
    }

    /// Advance the match clock while in a match
    pub fn advance(&self, delta_secs: f32) {
        if self.mode.get() == FacadeMode::InMatch {
            self.elapsed.set(self.elapsed.get() + delta_secs);
        }
    }
}

impl Default for ScriptedFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl SdkFacade for ScriptedFacade {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.get()
    }

    fn is_in_match(&self) -> bool {
        self.mode.get() == FacadeMode::InMatch
    }

    fn is_in_practice(&self) -> bool {
        self.mode.get() == FacadeMode::Practice
    }

    fn is_in_matchmaking(&self) -> bool {
        self.mode.get() == FacadeMode::Matchmaking
    }

    fn remaining_time(&self) -> f32 {
        let duration = self.duration.get();
        if duration <= 0.0 {
            return 0.0;
        }
        (duration - self.elapsed.get()).max(0.0)
    }

    fn elapsed_time(&self) -> f32 {
        self.elapsed.get()
    }

    fn current_score(&self) -> i64 {
        self.score.get()
    }

    fn current_match(&self) -> MatchInfo {
        self.current.borrow().clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn request_initialize(&self) {
        self.init_requests.set(self.init_requests.get() + 1);
        debug!(requests = self.init_requests.get(), "ScriptedFacade::request_initialize: called");

        let policy = self.init_policy.borrow().clone();
        match policy {
            InitPolicy::Succeed => self.complete_initialization(true, SdkError::none()),
            InitPolicy::Fail(error) => self.complete_initialization(false, error),
            InitPolicy::Manual => {}
        }
    }

    fn subscribe(&self) -> NotificationReceiver {
        let (tx, rx) = notification_channel();
        self.subscribers.borrow_mut().push(tx);
        debug!(subscribers = self.subscribers.borrow().len(), "ScriptedFacade::subscribe: called");
        rx
    }
}
