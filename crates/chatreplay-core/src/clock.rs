#![forbid(unsafe_code)]

//! Time sources for the playhead.
//!
//! The scheduler never reads the system clock directly. It asks a [`Clock`]
//! for a monotonic reading, which lets tests drive a session with
//! [`ManualClock`] and get identical results on every run.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(delta))
            });
    }

    /// Move time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}
