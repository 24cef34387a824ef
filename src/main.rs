//! MatchBridge - match coordinator for the competitive-gaming SDK
//!
//! CLI entry point for running scripted scenarios against a headless host.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{error, info};

use matchbridge::cli::{Cli, Command, OutputFormat, get_log_path};
use matchbridge::config::Config;
use matchbridge::coordinator::DebugSnapshot;
use matchbridge::events::{CoordinatorEvent, EventLogEntry, EventLogger};
use matchbridge::host::OverlayRenderer;
use matchbridge::scenario::Scenario;
use matchbridge::simulation::{Simulation, SimulationSummary};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let log_path = get_log_path();
    let log_file = log_path
        .parent()
        .map(|dir| fs::create_dir_all(dir).and_then(|_| fs::File::create(&log_path)));

    match log_file {
        Some(Ok(file)) => {
            // Log to file, not stdout/stderr
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        "MatchBridge loaded config: tick-rate={}Hz, sdk-service-key={}",
        config.host.tick_rate_hz, config.host.sdk_service_key
    );

    match cli.command {
        Some(Command::Simulate {
            scenario,
            tick_rate,
            event_log,
            debug_overlay,
            realtime,
            format,
        }) => {
            let options = SimulateOptions {
                scenario,
                tick_rate,
                event_log,
                debug_overlay,
                realtime,
                format,
            };
            cmd_simulate(config, options).await
        }
        Some(Command::Config) => cmd_config(&config),
        Some(Command::Scenario) => cmd_scenario(),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

struct SimulateOptions {
    scenario: Option<PathBuf>,
    tick_rate: Option<u32>,
    event_log: Option<PathBuf>,
    debug_overlay: bool,
    realtime: bool,
    format: OutputFormat,
}

/// Draws the debug overlay on stderr whenever it changes
#[derive(Default)]
struct TerminalOverlay {
    last: RefCell<Option<String>>,
}

impl OverlayRenderer for TerminalOverlay {
    fn render(&self, snapshot: &DebugSnapshot) {
        let text = snapshot.to_string();
        let mut last = self.last.borrow_mut();
        if last.as_deref() != Some(text.as_str()) {
            eprintln!("{}", text.trim_end().dimmed());
            *last = Some(text);
        }
    }
}

/// Run a scenario and print every coordinator event
async fn cmd_simulate(mut config: Config, options: SimulateOptions) -> Result<()> {
    if let Some(hz) = options.tick_rate {
        config.host.tick_rate_hz = hz;
    }
    if options.debug_overlay {
        config.coordinator.show_debug_overlay = true;
    }

    let scenario = match &options.scenario {
        Some(path) => {
            Scenario::load(path).context(format!("Failed to load scenario from {}", path.display()))?
        }
        None => Scenario::builtin(),
    };
    info!(scenario = %scenario.name, steps = scenario.steps.len(), "Starting simulation");

    let mut simulation = Simulation::new(&config, scenario, Rc::new(TerminalOverlay::default()))?;

    let logger = match &options.event_log {
        Some(path) => Some(Rc::new(RefCell::new(EventLogger::create(path)?))),
        None => None,
    };

    let format = options.format;
    let sink = logger.clone();
    simulation.on_event(move |clock, event| {
        print_event(format, clock, event);
        if let Some(logger) = &sink {
            if let Err(e) = logger.borrow_mut().write_event(clock, event) {
                error!("Failed to write event log: {}", e);
            }
        }
    });

    if options.realtime {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(simulation.tick_secs()));
        loop {
            interval.tick().await;
            if !simulation.step() {
                break;
            }
        }
    } else {
        simulation.run_to_end();
    }

    let summary = simulation.finish();

    if let Some(logger) = &logger {
        let logger = logger.borrow();
        info!(path = %logger.path().display(), written = logger.written(), "Event log written");
    }

    if format == OutputFormat::Text {
        print_summary(&summary);
    }
    Ok(())
}

fn print_event(format: OutputFormat, clock: f64, event: &CoordinatorEvent) {
    match format {
        OutputFormat::Json => match serde_json::to_string(&EventLogEntry::new(clock, event.clone())) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize event: {}", e),
        },
        OutputFormat::Text => {
            let stamp = format!("[{:>7.2}s]", clock).dimmed();
            let text = event.to_string();
            let text = match event {
                CoordinatorEvent::ErrorOccurred(_) => text.red(),
                CoordinatorEvent::TimeUpdate(_) => text.normal(),
                CoordinatorEvent::GameplayStart(_) => text.green().bold(),
                CoordinatorEvent::MatchCompleted(_) => text.cyan().bold(),
                _ => text.yellow(),
            };
            println!("{} {}", stamp, text);
        }
    }
}

fn print_summary(summary: &SimulationSummary) {
    println!();
    println!(
        "{} {} in {} ticks ({:.2}s simulated), {} events",
        "Finished".green().bold(),
        summary.scenario,
        summary.ticks,
        summary.simulated_secs,
        summary.events
    );
    for (event_type, count) in &summary.by_type {
        println!("  {:<16} {}", event_type, count);
    }
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}

/// Print the built-in scenario
fn cmd_scenario() -> Result<()> {
    print!("{}", Scenario::builtin().to_yaml()?);
    Ok(())
}
