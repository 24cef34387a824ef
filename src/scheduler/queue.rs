//! Queue types for the timer scheduler

use std::cmp::Ordering;

/// Handle for a scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Deferred action run once when its timer fires
pub type TimerCallback = Box<dyn FnOnce()>;

/// A one-shot timer waiting in the queue
pub struct ScheduledTimer {
    pub id: TimerId,
    /// Scheduler clock value (seconds) at which the timer fires
    pub due_at: f64,
    pub callback: TimerCallback,
}

impl ScheduledTimer {
    pub fn new(id: TimerId, due_at: f64, callback: TimerCallback) -> Self {
        Self { id, due_at, callback }
    }
}

impl std::fmt::Debug for ScheduledTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTimer")
            .field("id", &self.id)
            .field("due_at", &self.due_at)
            .finish_non_exhaustive()
    }
}

impl Eq for ScheduledTimer {}

impl PartialEq for ScheduledTimer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for ScheduledTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: earliest due first, then earliest scheduled
        other
            .due_at
            .total_cmp(&self.due_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for ScheduledTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Statistics for the timer scheduler
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TimerStats {
    pub total_scheduled: u64,
    pub total_fired: u64,
    pub total_cancelled: u64,
    pub peak_pending: usize,
}
