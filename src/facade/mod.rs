//! SDK facade boundary
//!
//! The competitive-match SDK is an external collaborator. The coordinator only
//! queries it through [`SdkFacade`] and consumes its notifications from the
//! receiver returned by [`SdkFacade::subscribe`].
//!
//! Notifications are queued on an unbounded channel rather than delivered as
//! callbacks, so the facade can report from inside `request_initialize`
//! without re-entering the coordinator. The coordinator drains the queue on
//! its own tick, in arrival order.

mod scripted;

use tokio::sync::mpsc;

use crate::domain::{MatchInfo, MatchResult, SdkError};

pub use scripted::{FacadeMode, InitPolicy, ScriptedFacade};

/// Well-known subsystem key the host registers the SDK facade under
pub const SDK_SERVICE_KEY: &str = "matchbridge.sdk";

/// Notification emitted by the facade
#[derive(Debug, Clone, PartialEq)]
pub enum FacadeNotification {
    /// Initialization finished (successfully or not)
    Initialized { success: bool, error: SdkError },
    /// A match was found and has started
    MatchStarted { info: MatchInfo, error: SdkError },
    /// A match ended and results are available
    MatchCompleted { result: MatchResult, error: SdkError },
    /// Standalone failure
    Error { error: SdkError },
}

impl FacadeNotification {
    /// Get the notification name
    pub fn kind(&self) -> &'static str {
        match self {
            FacadeNotification::Initialized { .. } => "Initialized",
            FacadeNotification::MatchStarted { .. } => "MatchStarted",
            FacadeNotification::MatchCompleted { .. } => "MatchCompleted",
            FacadeNotification::Error { .. } => "Error",
        }
    }
}

/// Sending half held by a facade for one subscriber
pub type NotificationSender = mpsc::UnboundedSender<FacadeNotification>;

/// Receiving half held by a subscriber
pub type NotificationReceiver = mpsc::UnboundedReceiver<FacadeNotification>;

/// Create a connected notification channel
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Capability set the coordinator requires from the SDK
pub trait SdkFacade {
    fn is_ready(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    fn is_in_match(&self) -> bool;

    fn is_in_practice(&self) -> bool;

    fn is_in_matchmaking(&self) -> bool;

    /// Seconds left in the current match
    fn remaining_time(&self) -> f32;

    /// Seconds played in the current match
    fn elapsed_time(&self) -> f32;

    fn current_score(&self) -> i64;

    fn current_match(&self) -> MatchInfo;

    fn version(&self) -> String;

    /// Ask the SDK to initialize; the outcome arrives as
    /// [`FacadeNotification::Initialized`]
    fn request_initialize(&self);

    /// Register a new subscriber; every later notification is delivered to it
    fn subscribe(&self) -> NotificationReceiver;
}
