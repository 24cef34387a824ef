//! Timer scheduler implementation

use std::cell::{Cell, RefCell};
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use super::config::SchedulerConfig;
use super::queue::{ScheduledTimer, TimerId, TimerStats};

/// Tolerance when comparing a due time against the clock, so deltas that sum
/// to exactly the delay still fire despite float rounding
const CLOCK_EPSILON: f64 = 1e-9;

/// Internal state
struct SchedulerInner {
    /// Pending timers, earliest due on top
    queue: BinaryHeap<ScheduledTimer>,

    /// Statistics
    stats: TimerStats,
}

/// One-shot timers on the host's scheduling clock
///
/// The clock only moves when the host calls [`TimerScheduler::advance`] from its
/// tick, so everything runs on the tick thread and nothing blocks.
pub struct TimerScheduler {
    config: SchedulerConfig,
    now: Cell<f64>,
    next_id: Cell<u64>,
    inner: RefCell<SchedulerInner>,
}

impl TimerScheduler {
    /// Create a new scheduler with the clock at zero
    pub fn new(config: SchedulerConfig) -> Self {
        debug!(?config, "TimerScheduler::new: called");
        Self {
            config,
            now: Cell::new(0.0),
            next_id: Cell::new(1),
            inner: RefCell::new(SchedulerInner {
                queue: BinaryHeap::new(),
                stats: TimerStats::default(),
            }),
        }
    }

    /// Current clock value in seconds
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Run `callback` once, `delay_secs` after the current clock value
    pub fn schedule_once(&self, delay_secs: f32, callback: impl FnOnce() + 'static) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let due_at = self.now.get() + f64::from(delay_secs.max(0.0));
        debug!(%id, delay_secs, due_at, "TimerScheduler::schedule_once: called");

        let mut inner = self.inner.borrow_mut();
        inner.queue.push(ScheduledTimer::new(id, due_at, Box::new(callback)));
        inner.stats.total_scheduled += 1;
        inner.stats.peak_pending = inner.stats.peak_pending.max(inner.queue.len());
        id
    }

    /// Remove a pending timer; false if it already fired or was never scheduled
    pub fn cancel(&self, id: TimerId) -> bool {
        debug!(%id, "TimerScheduler::cancel: called");
        let mut inner = self.inner.borrow_mut();

        let original_len = inner.queue.len();
        let remaining: Vec<_> = inner.queue.drain().filter(|t| t.id != id).collect();
        inner.queue = remaining.into_iter().collect();

        let removed = original_len != inner.queue.len();
        if removed {
            inner.stats.total_cancelled += 1;
        }
        removed
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Get the scheduler statistics
    pub fn stats(&self) -> TimerStats {
        self.inner.borrow().stats.clone()
    }

    /// Move the clock forward and fire every timer that came due
    ///
    /// Timers fire in due order. Callbacks run with no internal borrow held, so
    /// they may schedule or cancel timers; a timer they schedule that is
    /// already due fires in this same call.
    pub fn advance(&self, delta_secs: f32) -> usize {
        let now = self.now.get() + f64::from(delta_secs.max(0.0));
        self.now.set(now);

        let mut fired = 0;
        while fired < self.config.max_fires_per_advance {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due = inner.queue.peek().is_some_and(|t| t.due_at <= now + CLOCK_EPSILON);
                if due { inner.queue.pop() } else { None }
            };

            let Some(timer) = next else {
                break;
            };

            debug!(id = %timer.id, due_at = timer.due_at, now, "TimerScheduler::advance: firing");
            self.inner.borrow_mut().stats.total_fired += 1;
            (timer.callback)();
            fired += 1;
        }

        if fired == self.config.max_fires_per_advance && self.has_due(now) {
            warn!(fired, "TimerScheduler::advance: fire limit reached, deferring remaining timers");
        }

        fired
    }

    fn has_due(&self, now: f64) -> bool {
        self.inner
            .borrow()
            .queue
            .peek()
            .is_some_and(|t| t.due_at <= now + CLOCK_EPSILON)
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
