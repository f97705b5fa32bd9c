#![forbid(unsafe_code)]

//! Cancelable repeating tasks for a single-threaded event loop.
//!
//! A [`RepeatingTask`] is a deadline, an interval, and a generation counter.
//! The owner polls it with the current clock reading; when the deadline has
//! passed, `poll` returns `true` once and schedules the next deadline one
//! interval after *now*, so a slow tick never queues a burst of catch-up
//! firings.
//!
//! Starting a task always cancels the chain that was running before, and
//! cancelling is idempotent. There is therefore at most one live chain per
//! task, no matter how often `start` is called.
//!
//! # Example
//!
//! ```
//! use chatreplay_core::timer::RepeatingTask;
//! use std::time::Duration;
//!
//! let mut task = RepeatingTask::new("progress", Duration::from_millis(500));
//! task.start(Duration::ZERO);
//! assert!(!task.poll(Duration::from_millis(499)));
//! assert!(task.poll(Duration::from_millis(500)));
//! task.cancel();
//! assert!(!task.poll(Duration::from_secs(10)));
//! ```

use web_time::Duration;

/// Identifies one started chain of a [`RepeatingTask`].
pub type ChainId = u64;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A recurring deadline that can be started, polled, and cancelled.
#[derive(Debug, Clone)]
pub struct RepeatingTask {
    name: &'static str,
    interval: Duration,
    next_due: Option<Duration>,
    chain: ChainId,
}

impl RepeatingTask {
    /// Create an idle task. Intervals below 1ms are raised to 1ms.
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval: interval.max(MIN_INTERVAL),
            next_due: None,
            chain: 0,
        }
    }

    /// Task name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Interval between firings.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval. A running chain picks it up after its next firing.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
    }

    /// Whether a chain is currently scheduled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Deadline of the next firing, if active.
    #[must_use]
    pub const fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// Identifier of the most recently started chain (0 before the first start).
    #[must_use]
    pub const fn chain(&self) -> ChainId {
        self.chain
    }

    /// Start a new chain whose first firing is one interval from `now`.
    ///
    /// Any previous chain is cancelled first.
    pub fn start(&mut self, now: Duration) -> ChainId {
        self.start_at(now, now.saturating_add(self.interval))
    }

    /// Start a new chain that fires on the very next poll.
    pub fn start_immediate(&mut self, now: Duration) -> ChainId {
        self.start_at(now, now)
    }

    fn start_at(&mut self, now: Duration, first_due: Duration) -> ChainId {
        self.cancel();
        self.chain = self.chain.wrapping_add(1);
        self.next_due = Some(first_due);
        tracing::debug!(
            task = self.name,
            chain = self.chain,
            now_ms = u64::try_from(now.as_millis()).unwrap_or(u64::MAX),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "repeating task started"
        );
        self.chain
    }

    /// Cancel the current chain. Returns `true` if a chain was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.next_due.take().is_some();
        if was_active {
            tracing::debug!(task = self.name, chain = self.chain, "repeating task cancelled");
        }
        was_active
    }

    /// Fire if due. On firing, the next deadline is `now + interval`.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now.saturating_add(self.interval));
                true
            }
            _ => false,
        }
    }
}
