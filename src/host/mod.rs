//! Hosting environment
//!
//! The engine side of the boundary: subsystems, the running stage, the timer
//! scheduler and the tick. [`Host`] is a headless implementation used by the
//! CLI and the tests; an engine integration implements [`HostContext`].

mod config;
mod runtime;
mod subsystems;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::coordinator::{Coordinator, DebugSnapshot};
use crate::facade::SdkFacade;
use crate::registry::CoordinatorRegistry;
use crate::scheduler::TimerScheduler;

pub use config::HostConfig;
pub use runtime::Host;
pub use subsystems::Subsystems;

/// What the registry and the lifecycle manager need from the host
pub trait HostContext {
    /// The single-instance coordinator slot
    fn registry(&self) -> &CoordinatorRegistry;

    /// Key the SDK facade is registered under
    fn sdk_service_key(&self) -> &str;

    /// Look up a facade; the host keeps ownership
    fn resolve_facade(&self, key: &str) -> Option<Rc<dyn SdkFacade>>;

    fn timers(&self) -> Rc<TimerScheduler>;

    /// Where debug overlays are drawn, if anywhere
    fn overlay(&self) -> Option<Rc<dyn OverlayRenderer>>;

    /// A coordinator already placed in the running stage that has not finished play
    fn find_coordinator(&self) -> Option<Rc<Coordinator>>;

    /// Create a coordinator in the running stage and begin its play
    fn spawn_coordinator(&self, name: &str) -> Option<Rc<Coordinator>>;
}

/// Draws the coordinator's debug overlay
pub trait OverlayRenderer {
    fn render(&self, snapshot: &DebugSnapshot);
}

/// Overlay renderer for headless hosts: logs the snapshot whenever it changes
#[derive(Default)]
pub struct TracingOverlay {
    last: RefCell<Option<String>>,
}

impl TracingOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverlayRenderer for TracingOverlay {
    fn render(&self, snapshot: &DebugSnapshot) {
        let text = snapshot.to_string();
        let mut last = self.last.borrow_mut();
        if last.as_deref() != Some(text.as_str()) {
            debug!(overlay = %text.trim_end(), "TracingOverlay::render");
            *last = Some(text);
        }
    }
}
