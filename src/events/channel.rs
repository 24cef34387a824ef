//! Observer list for a single event type

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by subscribe, unique across every channel in the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A subscribed callback
pub type Listener<T> = Rc<dyn Fn(&T)>;

/// Ordered listeners for one event type
///
/// Listeners run in subscription order. `raise` works from a snapshot, so a
/// listener may subscribe or unsubscribe during dispatch. A listener removed
/// mid-raise (including by `clear`) is skipped straight away; one added
/// mid-raise runs from the next raise.
pub struct EventChannel<T> {
    name: &'static str,
    listeners: RefCell<Vec<(ListenerId, Listener<T>)>>,
}

impl<T> EventChannel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Add a listener at the end of the list
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> ListenerId {
        let id = ListenerId::next();
        let listener: Listener<T> = Rc::new(listener);
        self.listeners.borrow_mut().push((id, listener));
        debug!(channel = self.name, %id, "EventChannel::subscribe: called");
        id
    }

    /// Remove a listener; false if this channel does not hold it
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(channel = self.name, %id, "EventChannel::unsubscribe: removed");
        }
        removed
    }

    /// Invoke every listener with the payload, returning how many ran
    pub fn raise(&self, payload: &T) -> usize {
        let snapshot: Vec<(ListenerId, Listener<T>)> = self.listeners.borrow().clone();
        let mut ran = 0;
        for (id, listener) in &snapshot {
            if !self.contains(*id) {
                debug!(channel = self.name, %id, "EventChannel::raise: removed during dispatch, skipping");
                continue;
            }
            listener(payload);
            ran += 1;
        }
        ran
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|(lid, _)| *lid == id)
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<T> std::fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("listeners", &self.len())
            .finish()
    }
}
