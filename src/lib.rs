//! MatchBridge - match coordinator for a competitive-gaming SDK
//!
//! MatchBridge sits between a game host and an SDK facade. It keeps exactly
//! one live coordinator per game instance, relays SDK lifecycle notifications
//! as strongly typed events, and adds the derived events a game needs on top.
//!
//! # Core Concepts
//!
//! - **Single Instance**: The registry holds at most one active coordinator;
//!   later ones are rejected as duplicates
//! - **Event Bridge**: SDK notifications become coordinator events, delivered
//!   synchronously in registration order
//! - **Delayed Start**: Gameplay-Start follows Match-Ready by half a second
//! - **Frame Monitor**: Time-Update once per elapsed in-match second
//!
//! # Modules
//!
//! - [`coordinator`] - Lifecycle manager, event bridge and per-frame monitor
//! - [`registry`] - Single-instance coordinator slot
//! - [`events`] - Event types, listener channels and the JSONL event log
//! - [`facade`] - SDK facade boundary and the scripted test facade
//! - [`host`] - Host boundary and the headless host runtime
//! - [`scheduler`] - One-shot timers on the host clock
//! - [`scenario`] - Scripted SDK scenarios
//! - [`simulation`] - Headless scenario runs
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod events;
pub mod facade;
pub mod host;
pub mod registry;
pub mod scenario;
pub mod scheduler;
pub mod simulation;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorError, EndPlayReason, LifecycleState};
pub use domain::{ErrorKind, MatchInfo, MatchOutcome, MatchResult, PlayerInfo, SdkError};
pub use events::{CoordinatorEvent, EventHub, ListenerId};
pub use facade::{FacadeNotification, InitPolicy, ScriptedFacade, SdkFacade};
pub use host::{Host, HostConfig, HostContext, OverlayRenderer};
pub use registry::CoordinatorRegistry;
pub use scenario::{Scenario, ScenarioRunner};
pub use scheduler::{TimerId, TimerScheduler};
pub use simulation::{Simulation, SimulationSummary};
