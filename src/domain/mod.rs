//! Domain types for matchbridge
//!
//! Value snapshots produced by the SDK facade and carried unmodified through
//! the coordinator's events: match info, match results and SDK errors.

mod error;
mod match_info;
mod result;

pub use error::{ErrorKind, SdkError};
pub use match_info::{MatchInfo, PlayerInfo};
pub use result::{MatchOutcome, MatchResult};
