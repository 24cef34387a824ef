//! Headless host runtime

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info};

use super::config::HostConfig;
use super::subsystems::Subsystems;
use super::{HostContext, OverlayRenderer};
use crate::coordinator::{Coordinator, CoordinatorConfig, EndPlayReason, LifecycleState};
use crate::facade::SdkFacade;
use crate::registry::CoordinatorRegistry;
use crate::scheduler::TimerScheduler;

/// The running scene and the coordinators placed in it
struct Stage {
    name: String,
    coordinators: Vec<Rc<Coordinator>>,
}

/// Headless hosting environment
///
/// Owns the registry, the subsystems and the timer scheduler, and drives
/// everything from [`Host::tick`].
pub struct Host {
    config: HostConfig,
    registry: CoordinatorRegistry,
    subsystems: Subsystems,
    timers: Rc<TimerScheduler>,
    overlay: Option<Rc<dyn OverlayRenderer>>,
    spawn_config: CoordinatorConfig,
    stage: RefCell<Stage>,
    ticks: Cell<u64>,
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        debug!(?config, "Host::new: called");
        let timers = Rc::new(TimerScheduler::new(config.scheduler.clone()));
        Self {
            config,
            registry: CoordinatorRegistry::new(),
            subsystems: Subsystems::new(),
            timers,
            overlay: None,
            spawn_config: CoordinatorConfig::default(),
            stage: RefCell::new(Stage {
                name: "main".to_string(),
                coordinators: Vec::new(),
            }),
            ticks: Cell::new(0),
        }
    }

    /// Draw debug overlays with this renderer
    pub fn with_overlay(mut self, overlay: Rc<dyn OverlayRenderer>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Configuration for coordinators the registry auto-spawns
    pub fn with_spawn_config(mut self, config: CoordinatorConfig) -> Self {
        self.spawn_config = config;
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    // === Subsystems ===

    /// Register the SDK facade under the configured service key
    pub fn register_facade(&self, facade: Rc<dyn SdkFacade>) {
        self.subsystems.register(self.config.sdk_service_key.clone(), facade);
    }

    pub fn subsystems(&self) -> &Subsystems {
        &self.subsystems
    }

    // === Stage ===

    /// Add a coordinator to the stage without beginning play
    pub fn place(&self, coordinator: Rc<Coordinator>) {
        debug!(name = %coordinator.name(), "Host::place: called");
        self.stage.borrow_mut().coordinators.push(coordinator);
    }

    /// Create a coordinator in the stage and begin its play
    ///
    /// A coordinator rejected as a duplicate is removed from the stage
    /// straight away; the returned handle shows its final state.
    pub fn spawn(&self, name: &str, config: CoordinatorConfig) -> Rc<Coordinator> {
        let coordinator = Coordinator::new(name, config);
        debug!(name, id = %coordinator.id(), "Host::spawn: called");
        self.place(coordinator.clone());
        coordinator.begin_play(self);
        self.destroy_rejected();
        coordinator
    }

    /// End play for a coordinator and take it out of the stage
    pub fn remove(&self, coordinator: &Rc<Coordinator>) -> bool {
        let removed = {
            let mut stage = self.stage.borrow_mut();
            let before = stage.coordinators.len();
            stage.coordinators.retain(|c| !Rc::ptr_eq(c, coordinator));
            before != stage.coordinators.len()
        };
        if removed {
            coordinator.end_play(&self.registry, EndPlayReason::Destroyed);
        }
        removed
    }

    /// Replace the running stage
    ///
    /// Non-persistent coordinators are torn down; persistent active ones are
    /// carried over. The newly placed coordinators then begin play, so one
    /// placed while a persistent coordinator is still active is rejected.
    pub fn load_stage(&self, name: &str, placed: Vec<Rc<Coordinator>>) {
        info!(stage = %name, placed = placed.len(), "Loading stage");

        let previous = {
            let mut stage = self.stage.borrow_mut();
            stage.name = name.to_string();
            std::mem::take(&mut stage.coordinators)
        };

        let mut carried = Vec::new();
        for coordinator in previous {
            if coordinator.persists() && coordinator.is_active() {
                debug!(name = %coordinator.name(), "Host::load_stage: carrying over");
                carried.push(coordinator);
            } else {
                coordinator.end_play(&self.registry, EndPlayReason::StageUnloaded);
            }
        }
        self.stage.borrow_mut().coordinators = carried;

        for coordinator in placed {
            self.place(coordinator.clone());
            coordinator.begin_play(self);
        }
        self.destroy_rejected();
    }

    fn destroy_rejected(&self) {
        let mut stage = self.stage.borrow_mut();
        stage.coordinators.retain(|c| c.state() != LifecycleState::RejectedDuplicate);
    }

    pub fn stage_name(&self) -> String {
        self.stage.borrow().name.clone()
    }

    pub fn stage_len(&self) -> usize {
        self.stage.borrow().coordinators.len()
    }

    pub fn coordinators(&self) -> Vec<Rc<Coordinator>> {
        self.stage.borrow().coordinators.clone()
    }

    /// The active coordinator, if any
    pub fn coordinator(&self) -> Option<Rc<Coordinator>> {
        self.registry.get()
    }

    // === Driving ===

    /// Current host clock in seconds
    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Advance one tick: fire due timers, then tick every coordinator
    pub fn tick(&self, delta_secs: f32) {
        self.ticks.set(self.ticks.get() + 1);
        self.timers.advance(delta_secs);

        let coordinators = self.coordinators();
        for coordinator in coordinators {
            coordinator.tick(delta_secs);
        }
    }

    /// End play for everything in the stage
    pub fn shutdown(&self) {
        let coordinators = std::mem::take(&mut self.stage.borrow_mut().coordinators);
        info!(coordinators = coordinators.len(), ticks = self.ticks.get(), "Host shutting down");
        for coordinator in coordinators {
            coordinator.end_play(&self.registry, EndPlayReason::Quit);
        }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl HostContext for Host {
    fn registry(&self) -> &CoordinatorRegistry {
        &self.registry
    }

    fn sdk_service_key(&self) -> &str {
        &self.config.sdk_service_key
    }

    fn resolve_facade(&self, key: &str) -> Option<Rc<dyn SdkFacade>> {
        self.subsystems.resolve(key)
    }

    fn timers(&self) -> Rc<TimerScheduler> {
        self.timers.clone()
    }

    fn overlay(&self) -> Option<Rc<dyn OverlayRenderer>> {
        self.overlay.clone()
    }

    fn find_coordinator(&self) -> Option<Rc<Coordinator>> {
        self.stage
            .borrow()
            .coordinators
            .iter()
            .find(|c| !c.state().is_terminal())
            .cloned()
    }

    fn spawn_coordinator(&self, name: &str) -> Option<Rc<Coordinator>> {
        Some(self.spawn(name, self.spawn_config))
    }
}
