//! Event payloads raised by the coordinator
//!
//! One payload struct per consumer-facing event, plus [`CoordinatorEvent`],
//! the tagged union delivered on the `any` channel and written to event logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MatchInfo, MatchResult, SdkError};

/// Initialization outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkInitialized {
    pub success: bool,
    #[serde(default)]
    pub error: SdkError,
}

/// The facade reported a match has started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReady {
    pub info: MatchInfo,
    #[serde(default)]
    pub error: SdkError,
}

/// Raised once, a fixed delay after [`MatchReady`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayStart {
    pub info: MatchInfo,
}

/// The facade reported a match has ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCompleted {
    pub result: MatchResult,
    #[serde(default)]
    pub error: SdkError,
}

/// Initialization failed or the facade reported a standalone error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorOccurred {
    pub error: SdkError,
}

/// Periodic match clock update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeUpdate {
    #[serde(rename = "remaining-secs")]
    pub remaining_secs: f32,
    #[serde(rename = "elapsed-secs")]
    pub elapsed_secs: f32,
}

/// Any coordinator event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoordinatorEvent {
    Initialized(SdkInitialized),
    MatchReady(MatchReady),
    GameplayStart(GameplayStart),
    MatchCompleted(MatchCompleted),
    ErrorOccurred(ErrorOccurred),
    TimeUpdate(TimeUpdate),
}

impl CoordinatorEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            CoordinatorEvent::Initialized(_) => "Initialized",
            CoordinatorEvent::MatchReady(_) => "MatchReady",
            CoordinatorEvent::GameplayStart(_) => "GameplayStart",
            CoordinatorEvent::MatchCompleted(_) => "MatchCompleted",
            CoordinatorEvent::ErrorOccurred(_) => "ErrorOccurred",
            CoordinatorEvent::TimeUpdate(_) => "TimeUpdate",
        }
    }

    /// Check if this is a per-second clock update
    pub fn is_time_update(&self) -> bool {
        matches!(self, CoordinatorEvent::TimeUpdate(_))
    }
}

impl From<SdkInitialized> for CoordinatorEvent {
    fn from(e: SdkInitialized) -> Self {
        CoordinatorEvent::Initialized(e)
    }
}

impl From<MatchReady> for CoordinatorEvent {
    fn from(e: MatchReady) -> Self {
        CoordinatorEvent::MatchReady(e)
    }
}

impl From<GameplayStart> for CoordinatorEvent {
    fn from(e: GameplayStart) -> Self {
        CoordinatorEvent::GameplayStart(e)
    }
}

impl From<MatchCompleted> for CoordinatorEvent {
    fn from(e: MatchCompleted) -> Self {
        CoordinatorEvent::MatchCompleted(e)
    }
}

impl From<ErrorOccurred> for CoordinatorEvent {
    fn from(e: ErrorOccurred) -> Self {
        CoordinatorEvent::ErrorOccurred(e)
    }
}

impl From<TimeUpdate> for CoordinatorEvent {
    fn from(e: TimeUpdate) -> Self {
        CoordinatorEvent::TimeUpdate(e)
    }
}

impl std::fmt::Display for CoordinatorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinatorEvent::Initialized(e) if e.success => write!(f, "Initialized: success"),
            CoordinatorEvent::Initialized(e) => write!(f, "Initialized: failed ({})", e.error),
            CoordinatorEvent::MatchReady(e) => write!(f, "MatchReady: {} [{}]", e.info.versus(), e.info.match_id),
            CoordinatorEvent::GameplayStart(e) => {
                write!(f, "GameplayStart: {} [{}]", e.info.versus(), e.info.match_id)
            }
            CoordinatorEvent::MatchCompleted(e) => write!(
                f,
                "MatchCompleted: {} score={} [{}]",
                e.result.outcome, e.result.player_score, e.result.match_id
            ),
            CoordinatorEvent::ErrorOccurred(e) => write!(f, "ErrorOccurred: {}", e.error),
            CoordinatorEvent::TimeUpdate(e) => write!(
                f,
                "TimeUpdate: remaining={:.1}s elapsed={:.1}s",
                e.remaining_secs, e.elapsed_secs
            ),
        }
    }
}

/// Wrapper for events persisted to JSONL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Wall-clock timestamp of the event
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    /// Host scheduler clock in seconds
    pub clock: f64,
    /// The event
    pub event: CoordinatorEvent,
}

impl EventLogEntry {
    /// Create a new log entry with current timestamp
    pub fn new(clock: f64, event: CoordinatorEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            clock,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, PlayerInfo};

    fn info() -> MatchInfo {
        MatchInfo::new("m-1", PlayerInfo::new("p1", "Alice"), PlayerInfo::new("p2", "Bob"))
    }

    #[test]
    fn test_event_type() {
        let event: CoordinatorEvent = GameplayStart { info: info() }.into();
        assert_eq!(event.event_type(), "GameplayStart");

        let event: CoordinatorEvent = TimeUpdate {
            remaining_secs: 10.0,
            elapsed_secs: 5.0,
        }
        .into();
        assert_eq!(event.event_type(), "TimeUpdate");
        assert!(event.is_time_update());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event: CoordinatorEvent = MatchReady {
            info: info(),
            error: SdkError::none(),
        }
        .into();

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"MatchReady""#));
        assert!(json.contains("Alice"));

        let parsed: CoordinatorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_display() {
        let event: CoordinatorEvent = SdkInitialized {
            success: false,
            error: SdkError::new(ErrorKind::Network, "timeout"),
        }
        .into();
        assert_eq!(event.to_string(), "Initialized: failed (network error: timeout)");

        let event: CoordinatorEvent = MatchReady {
            info: info(),
            error: SdkError::none(),
        }
        .into();
        assert_eq!(event.to_string(), "MatchReady: Alice vs Bob [m-1]");
    }

    #[test]
    fn test_event_log_entry_serialization() {
        let entry = EventLogEntry::new(
            1.5,
            ErrorOccurred {
                error: SdkError::message("boom"),
            }
            .into(),
        );

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""ts""#));
        assert!(json.contains(r#""clock":1.5"#));
        assert!(json.contains("ErrorOccurred"));
    }
}
