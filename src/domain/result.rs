//! Completed match results

use serde::{Deserialize, Serialize};

/// Win/loss/draw classification from the local player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
    #[default]
    Draw,
}

impl MatchOutcome {
    /// Classify by comparing scores
    pub fn from_scores(player_score: i64, opponent_score: i64) -> Self {
        match player_score.cmp(&opponent_score) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Less => Self::Loss,
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win => write!(f, "WIN"),
            Self::Loss => write!(f, "LOSS"),
            Self::Draw => write!(f, "DRAW"),
        }
    }
}

/// Snapshot of a completed match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match-id", default)]
    pub match_id: String,

    #[serde(rename = "player-score", default)]
    pub player_score: i64,

    #[serde(rename = "opponent-score", default)]
    pub opponent_score: i64,

    #[serde(default)]
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn new(match_id: impl Into<String>, player_score: i64, outcome: MatchOutcome) -> Self {
        Self {
            match_id: match_id.into(),
            player_score,
            opponent_score: 0,
            outcome,
        }
    }

    /// Build a result whose outcome is derived from the two scores
    pub fn scored(match_id: impl Into<String>, player_score: i64, opponent_score: i64) -> Self {
        Self {
            match_id: match_id.into(),
            player_score,
            opponent_score,
            outcome: MatchOutcome::from_scores(player_score, opponent_score),
        }
    }

    pub fn is_win(&self) -> bool {
        self.outcome == MatchOutcome::Win
    }

    pub fn is_loss(&self) -> bool {
        self.outcome == MatchOutcome::Loss
    }

    pub fn is_draw(&self) -> bool {
        self.outcome == MatchOutcome::Draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_scores() {
        assert_eq!(MatchOutcome::from_scores(1200, 900), MatchOutcome::Win);
        assert_eq!(MatchOutcome::from_scores(10, 90), MatchOutcome::Loss);
        assert_eq!(MatchOutcome::from_scores(5, 5), MatchOutcome::Draw);
    }

    #[test]
    fn test_scored_result() {
        let result = MatchResult::scored("m-1", 1200, 800);
        assert!(result.is_win());
        assert!(!result.is_loss());
        assert!(!result.is_draw());
        assert_eq!(result.outcome.to_string(), "WIN");
    }

    #[test]
    fn test_explicit_outcome_is_kept() {
        // The facade's classification is passed through, not recomputed
        let result = MatchResult::new("m-2", 1200, MatchOutcome::Loss);
        assert!(result.is_loss());
        assert_eq!(result.opponent_score, 0);
    }
}
