//! Scripted scenarios for the headless host
//!
//! A scenario is a YAML list of timed facade actions. [`ScenarioRunner`]
//! applies them to a [`ScriptedFacade`] as simulated time advances.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{ErrorKind, MatchInfo, MatchOutcome, MatchResult, PlayerInfo, SdkError};
use crate::facade::{FacadeMode, InitPolicy, ScriptedFacade};

/// Extra simulated time after the last step when no run length is given
const DEFAULT_TAIL_SECS: f32 = 1.0;

/// Step times within this distance of the clock count as due
const STEP_EPSILON: f64 = 1e-6;

/// Errors loading or validating a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Step {index} has invalid time {at}")]
    InvalidTime { index: usize, at: f32 },

    #[error("Step {index} at {at}s comes before the previous step at {previous}s")]
    OutOfOrder { index: usize, at: f32, previous: f32 },

    #[error("Run length {run_for}s ends before the last step at {last}s")]
    RunTooShort { run_for: f32, last: f32 },
}

/// A facade action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ScenarioAction {
    /// Answer the pending initialization with success
    InitializeOk,
    /// Answer the pending initialization with failure
    InitializeFail {
        #[serde(default)]
        kind: ErrorKind,
        #[serde(default)]
        message: String,
    },
    StartMatch {
        #[serde(rename = "match")]
        info: MatchInfo,
    },
    CompleteMatch { result: MatchResult },
    /// Standalone SDK error
    Error {
        #[serde(default)]
        kind: ErrorKind,
        #[serde(default)]
        message: String,
    },
    /// Set the in-match score
    Score { score: i64 },
    Practice,
    Matchmaking,
    Idle,
}

impl ScenarioAction {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioAction::InitializeOk => "initialize-ok",
            ScenarioAction::InitializeFail { .. } => "initialize-fail",
            ScenarioAction::StartMatch { .. } => "start-match",
            ScenarioAction::CompleteMatch { .. } => "complete-match",
            ScenarioAction::Error { .. } => "error",
            ScenarioAction::Score { .. } => "score",
            ScenarioAction::Practice => "practice",
            ScenarioAction::Matchmaking => "matchmaking",
            ScenarioAction::Idle => "idle",
        }
    }

    /// Apply this action to the facade
    pub fn apply(&self, facade: &ScriptedFacade) {
        match self {
            ScenarioAction::InitializeOk => facade.complete_initialization(true, SdkError::none()),
            ScenarioAction::InitializeFail { kind, message } => {
                facade.complete_initialization(false, SdkError::new(*kind, message.clone()))
            }
            ScenarioAction::StartMatch { info } => facade.start_match(info.clone()),
            ScenarioAction::CompleteMatch { result } => facade.complete_match(result.clone()),
            ScenarioAction::Error { kind, message } => facade.report_error(SdkError::new(*kind, message.clone())),
            ScenarioAction::Score { score } => facade.set_score(*score),
            ScenarioAction::Practice => facade.set_mode(FacadeMode::Practice),
            ScenarioAction::Matchmaking => facade.set_mode(FacadeMode::Matchmaking),
            ScenarioAction::Idle => facade.set_mode(FacadeMode::Idle),
        }
    }
}

/// One timed action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Seconds from the start of the run
    pub at: f32,

    #[serde(flatten)]
    pub action: ScenarioAction,
}

impl ScenarioStep {
    pub fn new(at: f32, action: ScenarioAction) -> Self {
        Self { at, action }
    }
}

/// A timed script of facade actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Total simulated seconds; defaults to one second past the last step
    #[serde(rename = "run-for-secs", default, skip_serializing_if = "Option::is_none")]
    pub run_for_secs: Option<f32>,

    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Parse and validate a scenario from YAML
    pub fn from_yaml(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        debug!(?path, "Scenario::load: called");
        let content = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ScenarioError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Steps must be at finite, non-negative, non-decreasing times
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut previous = 0.0f32;
        for (index, step) in self.steps.iter().enumerate() {
            if !step.at.is_finite() || step.at < 0.0 {
                return Err(ScenarioError::InvalidTime { index, at: step.at });
            }
            if step.at < previous {
                return Err(ScenarioError::OutOfOrder {
                    index,
                    at: step.at,
                    previous,
                });
            }
            previous = step.at;
        }

        match self.run_for_secs {
            Some(run_for) if !run_for.is_finite() || run_for < previous => {
                Err(ScenarioError::RunTooShort { run_for, last: previous })
            }
            _ => Ok(()),
        }
    }

    /// Time of the last step, zero when empty
    pub fn last_step_at(&self) -> f32 {
        self.steps.last().map(|s| s.at).unwrap_or(0.0)
    }

    /// Total simulated seconds to run
    pub fn duration(&self) -> f32 {
        self.run_for_secs.unwrap_or_else(|| self.last_step_at() + DEFAULT_TAIL_SECS)
    }

    /// Initialize, play one match between Alice and Bob, win it with 1200
    pub fn builtin() -> Self {
        let info = MatchInfo::new(
            "match-0001",
            PlayerInfo::new("player-alice", "Alice"),
            PlayerInfo::new("player-bob", "Bob"),
        )
        .with_duration(3.0);

        let mut result = MatchResult::new("match-0001", 1200, MatchOutcome::Win);
        result.opponent_score = 950;

        Self {
            name: "default".to_string(),
            description: "Initialize, play one match between Alice and Bob, win it with 1200".to_string(),
            run_for_secs: Some(5.0),
            steps: vec![
                ScenarioStep::new(0.1, ScenarioAction::InitializeOk),
                ScenarioStep::new(0.5, ScenarioAction::Matchmaking),
                ScenarioStep::new(1.0, ScenarioAction::StartMatch { info }),
                ScenarioStep::new(3.0, ScenarioAction::Score { score: 1200 }),
                ScenarioStep::new(4.0, ScenarioAction::CompleteMatch { result }),
            ],
        }
    }
}

/// Plays a scenario against a scripted facade
pub struct ScenarioRunner {
    scenario: Scenario,
    facade: Rc<ScriptedFacade>,
    elapsed: f64,
    next: usize,
}

impl ScenarioRunner {
    /// Validate the scenario and switch the facade to manual initialization,
    /// so `initialize-ok`/`initialize-fail` steps decide the outcome
    pub fn new(scenario: Scenario, facade: Rc<ScriptedFacade>) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Starting scenario");
        facade.set_init_policy(InitPolicy::Manual);
        Ok(Self {
            scenario,
            facade,
            elapsed: 0.0,
            next: 0,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn remaining_steps(&self) -> usize {
        self.scenario.steps.len() - self.next
    }

    /// All steps applied and the run length reached
    pub fn is_finished(&self) -> bool {
        self.remaining_steps() == 0 && self.elapsed + STEP_EPSILON >= f64::from(self.scenario.duration())
    }

    /// Advance simulated time, apply every step that came due and return how many
    pub fn advance(&mut self, delta_secs: f32) -> usize {
        self.elapsed += f64::from(delta_secs.max(0.0));
        self.facade.advance(delta_secs);

        let mut applied = 0;
        while let Some(step) = self.scenario.steps.get(self.next) {
            if f64::from(step.at) > self.elapsed + STEP_EPSILON {
                break;
            }
            debug!(at = step.at, action = step.action.label(), "ScenarioRunner::advance: applying step");
            step.action.apply(&self.facade);
            self.next += 1;
            applied += 1;
        }
        applied
    }
}
