//! SDK error values
//!
//! These are payloads, not Rust errors: the facade reports failures as values
//! and the coordinator forwards them inside events.

use serde::{Deserialize, Serialize};

/// Category of an SDK failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    #[default]
    Unknown,
    Network,
    Authentication,
    Matchmaking,
    Submission,
    InvalidState,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Network => write!(f, "network"),
            Self::Authentication => write!(f, "authentication"),
            Self::Matchmaking => write!(f, "matchmaking"),
            Self::Submission => write!(f, "submission"),
            Self::InvalidState => write!(f, "invalid-state"),
        }
    }
}

impl std::str::FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "network" => Ok(Self::Network),
            "authentication" | "auth" => Ok(Self::Authentication),
            "matchmaking" => Ok(Self::Matchmaking),
            "submission" => Ok(Self::Submission),
            "invalid-state" | "invalid_state" => Ok(Self::InvalidState),
            _ => Err(format!("Unknown error kind: {}", s)),
        }
    }
}

/// A failure reported by the SDK, or the "no error" sentinel
///
/// The sentinel is the only value without a kind, so it can never be
/// confused with a real error, even one with an empty message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    message: String,
}

impl SdkError {
    /// The "no error" sentinel
    pub fn none() -> Self {
        Self::default()
    }

    /// A real error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// A real error with no more specific category
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn is_none(&self) -> bool {
        self.kind.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_some()
    }

    /// Error kind, `None` for the sentinel
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            None => write!(f, "no error"),
            Some(kind) if self.message.is_empty() => write!(f, "{} error", kind),
            Some(kind) => write!(f, "{} error: {}", kind, self.message),
        }
    }
}
