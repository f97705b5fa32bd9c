#![forbid(unsafe_code)]

//! The replay session: event store, playhead, timers, and renderer in one
//! explicit object.
//!
//! A [`ReplaySession`] is driven cooperatively from a single thread. User
//! actions call [`play`](ReplaySession::play), [`pause`](ReplaySession::pause),
//! [`restart`](ReplaySession::restart) and [`seek`](ReplaySession::seek); the
//! event loop calls [`pump`](ReplaySession::pump) whenever
//! [`next_deadline`](ReplaySession::next_deadline) has passed. Two
//! [`RepeatingTask`]s decide when a pump does work:
//!
//! - the **reveal** task hands every newly due event to the renderer, and
//! - the **progress** task reports `(fraction, elapsed, total)`.
//!
//! # Invariants
//!
//! - Every event at index `< cursor` has been revealed since the last clear;
//!   no event at index `>= cursor` has.
//! - Reveals happen in strictly increasing index order, each exactly once,
//!   and never for an event whose offset is past the current elapsed time.
//! - At most one chain of each task is active. Both are cancelled before a
//!   new chain starts and whenever playback leaves `Playing`.
//! - A rejected seek leaves every field untouched.
//!
//! # Example
//!
//! ```
//! use chatreplay_core::{ChatEvent, EventStore, ManualClock, RecordingRenderer, ReplaySession};
//!
//! let store = EventStore::from_events(vec![
//!     ChatEvent::new(0, "ann", "hello", ""),
//!     ChatEvent::new(1_000, "bob", "hi", ""),
//! ]);
//! let clock = ManualClock::new();
//! let mut session = ReplaySession::new(store, clock.clone(), RecordingRenderer::new());
//!
//! session.play();
//! session.pump();
//! assert_eq!(session.cursor(), 1);
//!
//! clock.advance_ms(1_000);
//! session.pump();
//! assert_eq!(session.cursor(), 2);
//! ```

use serde::Serialize;
use web_time::Duration;

use crate::clock::Clock;
use crate::config::{MAX_SPEED, ReplayConfig};
use crate::error::SeekError;
use crate::playhead::{PlaybackState, Playhead};
use crate::renderer::{Progress, Renderer};
use crate::store::EventStore;
use crate::timecode::parse_time;
use crate::timer::RepeatingTask;

/// Default cadence of reveal passes.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(100);

/// Default cadence of progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// What a single [`ReplaySession::pump`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PumpOutcome {
    /// Events revealed by this pump.
    pub revealed: usize,
    /// Progress reported by this pump, if the progress task fired.
    pub progress: Option<Progress>,
}

/// Point-in-time view of a session for status lines and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub elapsed_ms: u64,
    pub cursor: usize,
    pub total_events: usize,
    pub speed: f64,
    pub progress: Progress,
}

impl PlaybackStatus {
    /// Every event has been revealed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.total_events
    }
}

/// One replay session over one event store.
pub struct ReplaySession<C: Clock, R: Renderer> {
    store: EventStore,
    playhead: Playhead,
    reveal_task: RepeatingTask,
    progress_task: RepeatingTask,
    clock: C,
    renderer: R,
}

impl<C: Clock, R: Renderer> ReplaySession<C, R> {
    /// Create a stopped session with default cadences and speed.
    pub fn new(store: EventStore, clock: C, renderer: R) -> Self {
        Self {
            store,
            playhead: Playhead::new(),
            reveal_task: RepeatingTask::new("reveal", DEFAULT_REVEAL_INTERVAL),
            progress_task: RepeatingTask::new("progress", DEFAULT_PROGRESS_INTERVAL),
            clock,
            renderer,
        }
    }

    /// Create a stopped session using the cadences and speed from `config`.
    ///
    /// `autoplay` and `start` are left to the caller.
    pub fn with_config(store: EventStore, clock: C, renderer: R, config: &ReplayConfig) -> Self {
        let mut session = Self::new(store, clock, renderer);
        session
            .reveal_task
            .set_interval(Duration::from_millis(config.timing.reveal_interval_ms));
        session
            .progress_task
            .set_interval(Duration::from_millis(config.timing.progress_interval_ms));
        session.set_speed(config.playback.speed);
        session
    }

    // --- accessors ---

    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Tear down the session and hand back its renderer.
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.playhead.state()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playhead.is_playing()
    }

    /// Index of the next event to reveal.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.playhead.cursor()
    }

    /// Simulated time since stream start.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.playhead.elapsed_ms(self.clock.now())
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.playhead.speed()
    }

    /// Progress at the current clock reading.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.elapsed_ms(), self.store.max_offset_ms())
    }

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        let elapsed_ms = self.elapsed_ms();
        PlaybackStatus {
            state: self.state(),
            elapsed_ms,
            cursor: self.cursor(),
            total_events: self.store.len(),
            speed: self.speed(),
            progress: Progress::new(elapsed_ms, self.store.max_offset_ms()),
        }
    }

    /// Whether the reveal and progress chains are scheduled.
    #[must_use]
    pub fn timers_active(&self) -> (bool, bool) {
        (self.reveal_task.is_active(), self.progress_task.is_active())
    }

    /// Earliest pending timer deadline on the session clock, if playing.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.reveal_task.next_due(), self.progress_task.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time until the next deadline, saturating at zero.
    #[must_use]
    pub fn time_until_deadline(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline().map(|due| due.saturating_sub(now))
    }

    // --- transitions ---

    /// `Stopped | Paused -> Playing`. No-op while already playing.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        let now = self.clock.now();
        self.playhead.resume(now);
        self.start_chains(now);
        tracing::info!(
            replay_event = "play",
            elapsed_ms = self.playhead.elapsed_ms(now),
            cursor = self.cursor(),
            speed = self.speed(),
        );
    }

    /// `Playing -> Paused`. No-op otherwise.
    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        let now = self.clock.now();
        self.playhead.freeze(now);
        self.cancel_chains();
        let progress = self.emit_progress(now);
        tracing::info!(
            replay_event = "pause",
            elapsed_ms = progress.elapsed_ms,
            cursor = self.cursor(),
        );
    }

    /// Pause when playing, play otherwise.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Any state `-> Stopped` at time zero with an empty display.
    pub fn restart(&mut self) {
        self.cancel_chains();
        self.playhead.reset();
        self.renderer.clear_revealed();
        self.emit_progress(self.clock.now());
        tracing::info!(replay_event = "restart", events = self.store.len());
    }

    /// Jump to `target_ms` and play from there.
    ///
    /// Targets past the last event are rejected: the renderer is told why and
    /// nothing else changes.
    pub fn seek(&mut self, target_ms: u64) -> Result<(), SeekError> {
        let max_ms = self.store.max_offset_ms();
        if target_ms > max_ms {
            let err = SeekError::OutOfRange { target_ms, max_ms };
            tracing::debug!(target_ms, max_ms, "seek rejected");
            self.renderer.report_validation_error(&err.to_string());
            return Err(err);
        }

        let now = self.clock.now();
        self.cancel_chains();
        let cursor = self.store.lower_bound(target_ms);
        let from_cursor = self.cursor();
        self.playhead.jump(target_ms, cursor, now);
        self.renderer.clear_revealed();
        self.playhead.resume(now);
        self.start_chains(now);
        tracing::info!(
            replay_event = "seek",
            target_ms,
            from_cursor,
            cursor,
        );
        Ok(())
    }

    /// Parse `H:MM:SS` and [`seek`](Self::seek) there.
    ///
    /// Malformed text is reported to the renderer and leaves state untouched.
    pub fn seek_to_str(&mut self, input: &str) -> Result<(), SeekError> {
        match parse_time(input) {
            Ok(target_ms) => self.seek(target_ms),
            Err(err) => {
                let err = SeekError::from(err);
                tracing::debug!(input, error = %err, "seek rejected");
                self.renderer.report_validation_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Set the playback multiplier, clamped to `(0, MAX_SPEED]`.
    ///
    /// Non-finite or non-positive values are ignored. Returns the speed in
    /// effect afterwards.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if !speed.is_finite() || speed <= 0.0 {
            tracing::warn!(speed, "ignoring invalid playback speed");
            return self.speed();
        }
        let speed = speed.min(MAX_SPEED);
        self.playhead.set_speed(speed, self.clock.now());
        tracing::debug!(speed, "playback speed changed");
        speed
    }

    /// Replace the event store, resetting playback and clearing the display.
    pub fn load(&mut self, store: EventStore) {
        self.cancel_chains();
        self.playhead.reset();
        self.store = store;
        self.renderer.clear_revealed();
        self.emit_progress(self.clock.now());
        tracing::info!(
            replay_event = "load",
            events = self.store.len(),
            max_offset_ms = self.store.max_offset_ms(),
        );
    }

    // --- loops ---

    /// Run whichever repeating tasks are due. Reveal runs before progress so
    /// a progress report never lags events revealed in the same pump.
    pub fn pump(&mut self) -> PumpOutcome {
        let now = self.clock.now();
        let mut outcome = PumpOutcome::default();
        if self.reveal_task.poll(now) {
            outcome.revealed = self.reveal_due(now);
        }
        if self.progress_task.poll(now) {
            outcome.progress = Some(self.emit_progress(now));
        }
        outcome
    }

    /// One reveal pass at the current clock reading. Returns the number of
    /// events revealed; always 0 unless playing.
    pub fn reveal_pass(&mut self) -> usize {
        let now = self.clock.now();
        self.reveal_due(now)
    }

    /// Report progress to the renderer now, regardless of cadence.
    pub fn report_progress(&mut self) -> Progress {
        let now = self.clock.now();
        self.emit_progress(now)
    }

    fn reveal_due(&mut self, now: Duration) -> usize {
        if !self.is_playing() {
            return 0;
        }
        let elapsed_ms = self.playhead.elapsed_ms(now);
        let start = self.playhead.cursor();
        while let Some(event) = self.store.get(self.playhead.cursor())
            && event.offset_ms <= elapsed_ms
        {
            self.renderer.reveal_event(event);
            self.playhead.advance_cursor();
        }
        let revealed = self.playhead.cursor() - start;
        if revealed > 0 {
            tracing::trace!(elapsed_ms, revealed, cursor = self.cursor(), "reveal pass");
        }
        revealed
    }

    fn emit_progress(&mut self, now: Duration) -> Progress {
        let progress = Progress::new(self.playhead.elapsed_ms(now), self.store.max_offset_ms());
        self.renderer.update_progress(progress);
        progress
    }

    fn start_chains(&mut self, now: Duration) {
        self.reveal_task.start_immediate(now);
        self.progress_task.start_immediate(now);
    }

    fn cancel_chains(&mut self) {
        self.reveal_task.cancel();
        self.progress_task.cancel();
    }
}

impl<C: Clock, R: Renderer> std::fmt::Debug for ReplaySession<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySession")
            .field("events", &self.store.len())
            .field("playhead", &self.playhead)
            .field("reveal_task", &self.reveal_task)
            .field("progress_task", &self.progress_task)
            .finish_non_exhaustive()
    }
}
