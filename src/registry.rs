//! Coordinator registry - the single-instance slot
//!
//! Holds at most one strong reference to the active coordinator. All
//! discovery goes through here; there is no ambient global.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::coordinator::{Coordinator, LifecycleState};
use crate::host::HostContext;

/// Name given to coordinators created by [`CoordinatorRegistry::get_or_create`]
pub const AUTO_SPAWN_NAME: &str = "MatchCoordinator_AutoSpawned";

/// Process-wide coordinator slot, owned by the host
///
/// The slot is only touched from the host tick thread. A host that ticks from
/// several threads has to put this behind a mutex.
#[derive(Default)]
pub struct CoordinatorRegistry {
    slot: RefCell<Option<Rc<Coordinator>>>,
}

impl CoordinatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered coordinator if it is still active
    pub fn get(&self) -> Option<Rc<Coordinator>> {
        self.slot.borrow().as_ref().filter(|c| c.is_active()).cloned()
    }

    /// True iff an active coordinator holds the slot
    pub fn is_active(&self) -> bool {
        self.get().is_some()
    }

    /// Return the active coordinator, discovering or spawning one through `ctx`
    ///
    /// Absence is a normal result: no context, or a context that cannot
    /// produce an active coordinator, yields `None`.
    pub fn get_or_create(&self, ctx: Option<&dyn HostContext>) -> Option<Rc<Coordinator>> {
        if let Some(active) = self.get() {
            return Some(active);
        }

        let Some(ctx) = ctx else {
            debug!("CoordinatorRegistry::get_or_create: no context, coordinator unavailable");
            return None;
        };

        if let Some(found) = ctx.find_coordinator() {
            debug!(name = %found.name(), state = %found.state(), "CoordinatorRegistry::get_or_create: found in stage");
            if found.state() == LifecycleState::Unregistered {
                found.begin_play(ctx);
            }
            if let Some(active) = self.get() {
                return Some(active);
            }
        }

        let spawned = ctx.spawn_coordinator(AUTO_SPAWN_NAME)?;
        if spawned.is_active() {
            info!(name = %spawned.name(), "Auto-spawned coordinator");
            Some(spawned)
        } else {
            debug!(state = %spawned.state(), "CoordinatorRegistry::get_or_create: spawned coordinator did not activate");
            self.get()
        }
    }

    /// Try to take the slot
    ///
    /// True if the slot was empty (or already held by this coordinator).
    pub fn claim(&self, coordinator: &Rc<Coordinator>) -> bool {
        let mut slot = self.slot.borrow_mut();
        match slot.as_ref() {
            Some(holder) if Rc::ptr_eq(holder, coordinator) => true,
            Some(holder) => {
                debug!(holder = %holder.name(), claimant = %coordinator.name(), "CoordinatorRegistry::claim: slot taken");
                false
            }
            None => {
                debug!(name = %coordinator.name(), "CoordinatorRegistry::claim: slot claimed");
                *slot = Some(coordinator.clone());
                true
            }
        }
    }

    /// Clear the slot if `coordinator` holds it
    pub fn release(&self, coordinator: &Coordinator) -> bool {
        let mut slot = self.slot.borrow_mut();
        let holds = slot.as_ref().is_some_and(|holder| std::ptr::eq(Rc::as_ptr(holder), coordinator));
        if holds {
            debug!(name = %coordinator.name(), "CoordinatorRegistry::release: slot cleared");
            *slot = None;
        }
        holds
    }
}

impl std::fmt::Debug for CoordinatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorRegistry")
            .field("holder", &self.slot.borrow().as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}
