//! Headless simulation: a host, a scripted facade and a scenario
//!
//! Used by the `simulate` command. Each step advances the scenario and then
//! ticks the host with the same delta.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use eyre::{Result, eyre};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::events::{CoordinatorEvent, ListenerId};
use crate::facade::ScriptedFacade;
use crate::host::{Host, HostContext, OverlayRenderer};
use crate::scenario::{Scenario, ScenarioRunner};
use crate::scheduler::TimerScheduler;

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub scenario: String,
    pub ticks: u64,
    #[serde(rename = "simulated-secs")]
    pub simulated_secs: f64,
    #[serde(rename = "scenario-secs")]
    pub scenario_secs: f64,
    pub events: usize,
    #[serde(rename = "by-type")]
    pub by_type: BTreeMap<String, usize>,
}

/// A running headless simulation
pub struct Simulation {
    host: Host,
    facade: Rc<ScriptedFacade>,
    runner: ScenarioRunner,
    coordinator: Rc<Coordinator>,
    tick_secs: f32,
    counts: Rc<RefCell<BTreeMap<String, usize>>>,
    total: Rc<Cell<usize>>,
}

impl Simulation {
    /// Build the host, register a scripted facade and obtain the coordinator
    /// through the registry
    pub fn new(config: &Config, scenario: Scenario, overlay: Rc<dyn OverlayRenderer>) -> Result<Self> {
        config.validate()?;
        debug!(scenario = %scenario.name, ?config, "Simulation::new: called");

        let host = Host::new(config.host.clone())
            .with_spawn_config(config.coordinator)
            .with_overlay(overlay);

        let facade = Rc::new(ScriptedFacade::new());
        host.register_facade(facade.clone());

        // The runner switches the facade to manual init before the coordinator asks
        let runner = ScenarioRunner::new(scenario, facade.clone())?;

        let coordinator = host
            .registry()
            .get_or_create(Some(&host))
            .ok_or_else(|| eyre!("No coordinator could be created"))?;

        let counts = Rc::new(RefCell::new(BTreeMap::new()));
        let total = Rc::new(Cell::new(0));
        {
            let counts = counts.clone();
            let total = total.clone();
            coordinator.events().on_any(move |event| {
                *counts.borrow_mut().entry(event.event_type().to_string()).or_insert(0) += 1;
                total.set(total.get() + 1);
            });
        }

        Ok(Self {
            tick_secs: config.host.tick_interval(),
            host,
            facade,
            runner,
            coordinator,
            counts,
            total,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn facade(&self) -> &Rc<ScriptedFacade> {
        &self.facade
    }

    pub fn coordinator(&self) -> &Rc<Coordinator> {
        &self.coordinator
    }

    pub fn tick_secs(&self) -> f32 {
        self.tick_secs
    }

    /// Subscribe to every coordinator event together with the host clock
    pub fn on_event(&self, listener: impl Fn(f64, &CoordinatorEvent) + 'static) -> ListenerId {
        let clock: Rc<TimerScheduler> = self.host.timers();
        self.coordinator
            .events()
            .on_any(move |event| listener(clock.now(), event))
    }

    pub fn is_finished(&self) -> bool {
        self.runner.is_finished()
    }

    /// Advance one tick; false once the scenario has finished
    pub fn step(&mut self) -> bool {
        if self.runner.is_finished() {
            return false;
        }
        self.runner.advance(self.tick_secs);
        self.host.tick(self.tick_secs);
        !self.runner.is_finished()
    }

    /// Step until the scenario has finished
    pub fn run_to_end(&mut self) {
        while self.step() {}
    }

    /// Shut the host down and report totals
    pub fn finish(self) -> SimulationSummary {
        self.host.shutdown();
        let summary = SimulationSummary {
            scenario: self.runner.scenario().name.clone(),
            ticks: self.host.ticks(),
            simulated_secs: self.host.now(),
            scenario_secs: self.runner.elapsed(),
            events: self.total.get(),
            by_type: self.counts.borrow().clone(),
        };
        info!(
            scenario = %summary.scenario,
            ticks = summary.ticks,
            events = summary.events,
            "Simulation finished"
        );
        summary
    }
}
