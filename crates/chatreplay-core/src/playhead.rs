#![forbid(unsafe_code)]

//! Simulated-time playhead state.
//!
//! The playhead is pure bookkeeping: a state, an anchor, and a cursor. It
//! never reads a clock; callers pass the current reading in. Elapsed time is
//! `anchor_ms + (now - origin) * speed` while playing and `anchor_ms`
//! otherwise, which is what makes pause/resume lossless: pausing folds the
//! running time into the anchor, and resuming starts a fresh origin.

use serde::Serialize;
use web_time::Duration;

/// Playback state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Initial state and the state after a restart.
    Stopped,
    /// Simulated time is advancing.
    Playing,
    /// Simulated time is frozen at the pause point.
    Paused,
}

impl PlaybackState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Elapsed-time and cursor bookkeeping for one session.
#[derive(Debug, Clone)]
pub struct Playhead {
    state: PlaybackState,
    anchor_ms: u64,
    origin: Option<Duration>,
    cursor: usize,
    speed: f64,
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new()
    }
}

impl Playhead {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            anchor_ms: 0,
            origin: None,
            cursor: 0,
            speed: 1.0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index of the next event to reveal.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Simulated milliseconds since stream start at clock reading `now`.
    #[must_use]
    pub fn elapsed_ms(&self, now: Duration) -> u64 {
        match (self.state, self.origin) {
            (PlaybackState::Playing, Some(origin)) => self
                .anchor_ms
                .saturating_add(scaled_ms(now.saturating_sub(origin), self.speed)),
            _ => self.anchor_ms,
        }
    }

    /// Start (or continue) advancing from the current anchor.
    pub(crate) fn resume(&mut self, now: Duration) {
        self.origin = Some(now);
        self.state = PlaybackState::Playing;
    }

    /// Fold running time into the anchor and stop advancing.
    pub(crate) fn freeze(&mut self, now: Duration) {
        self.anchor_ms = self.elapsed_ms(now);
        self.origin = None;
        self.state = PlaybackState::Paused;
    }

    /// Return to the initial state. Speed is kept.
    pub(crate) fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.anchor_ms = 0;
        self.origin = None;
        self.cursor = 0;
    }

    /// Jump to `target_ms` with the given cursor, leaving the state as-is.
    pub(crate) fn jump(&mut self, target_ms: u64, cursor: usize, now: Duration) {
        self.anchor_ms = target_ms;
        self.cursor = cursor;
        if self.origin.is_some() {
            self.origin = Some(now);
        }
    }

    /// Change speed without a discontinuity in elapsed time.
    pub(crate) fn set_speed(&mut self, speed: f64, now: Duration) {
        if self.is_playing() {
            self.anchor_ms = self.elapsed_ms(now);
            self.origin = Some(now);
        }
        self.speed = speed;
    }

    pub(crate) fn advance_cursor(&mut self) {
        self.cursor += 1;
    }
}

fn scaled_ms(delta: Duration, speed: f64) -> u64 {
    if speed == 1.0 {
        return u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
    }
    // Float-to-int `as` saturates and maps NaN to 0.
    (delta.as_secs_f64() * speed * 1_000.0) as u64
}
