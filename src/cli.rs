//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MatchBridge - match coordinator for the competitive-gaming SDK
#[derive(Parser)]
#[command(
    name = "matchbridge",
    about = "Headless match coordinator driven by scripted SDK scenarios",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/matchbridge/logs/matchbridge.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run a scenario against a headless host and print coordinator events
    Simulate {
        /// Scenario file (YAML); the built-in scenario is used when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Override the host tick rate
        #[arg(short, long, value_name = "HZ")]
        tick_rate: Option<u32>,

        /// Append every event as a JSON line to this file
        #[arg(short, long, value_name = "FILE")]
        event_log: Option<PathBuf>,

        /// Show the debug overlay on stderr
        #[arg(long)]
        debug_overlay: bool,

        /// Pace ticks in wall-clock time instead of running as fast as possible
        #[arg(long)]
        realtime: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration as YAML
    Config,

    /// Print the built-in scenario as YAML
    Scenario,
}

/// Output format for simulated events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" | "jsonl" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Default log file location
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matchbridge")
        .join("logs")
        .join("matchbridge.log")
}
