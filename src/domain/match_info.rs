//! Match participants and in-progress match snapshots

use serde::{Deserialize, Serialize};

/// One participant in a match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(rename = "player-id", default)]
    pub player_id: String,

    #[serde(default)]
    pub username: String,
}

impl PlayerInfo {
    pub fn new(player_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            username: username.into(),
        }
    }
}

/// Snapshot of an in-progress match
///
/// The default value is what queries return when no facade is bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    #[serde(rename = "match-id", default)]
    pub match_id: String,

    #[serde(rename = "local-player", default)]
    pub local_player: PlayerInfo,

    #[serde(default)]
    pub opponent: PlayerInfo,

    /// Match length in seconds, 0 when untimed
    #[serde(rename = "duration-secs", default)]
    pub duration_secs: f32,
}

impl MatchInfo {
    pub fn new(match_id: impl Into<String>, local_player: PlayerInfo, opponent: PlayerInfo) -> Self {
        Self {
            match_id: match_id.into(),
            local_player,
            opponent,
            duration_secs: 0.0,
        }
    }

    pub fn with_duration(mut self, duration_secs: f32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    /// True for the default "no match" value
    pub fn is_empty(&self) -> bool {
        self.match_id.is_empty() && self.local_player.username.is_empty() && self.opponent.username.is_empty()
    }

    /// "local vs opponent" label used in logs
    pub fn versus(&self) -> String {
        format!("{} vs {}", self.local_player.username, self.opponent.username)
    }
}
