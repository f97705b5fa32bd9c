#![forbid(unsafe_code)]

//! The rendering seam between the scheduler and whatever draws the chat.
//!
//! Everything the session shows goes through [`Renderer`]. The core never
//! writes to a terminal itself, so a session can run headless with
//! [`RecordingRenderer`] in tests.

use serde::Serialize;

use crate::event::ChatEvent;
use crate::timecode::format_time;

/// A progress snapshot emitted on the progress cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// `elapsed / total`, clamped to `[0, 1]`; 0 when `total_ms` is 0.
    pub fraction: f64,
    /// Simulated time since stream start.
    pub elapsed_ms: u64,
    /// Offset of the last event.
    pub total_ms: u64,
}

impl Progress {
    /// Compute a snapshot, guarding the zero-duration case.
    #[must_use]
    pub fn new(elapsed_ms: u64, total_ms: u64) -> Self {
        let fraction = if total_ms == 0 {
            0.0
        } else {
            (elapsed_ms as f64 / total_ms as f64).clamp(0.0, 1.0)
        };
        Self {
            fraction,
            elapsed_ms,
            total_ms,
        }
    }

    /// `elapsed / total` as `H:MM:SS / H:MM:SS`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.elapsed_ms),
            format_time(self.total_ms)
        )
    }

    /// Whole percent, floored.
    #[must_use]
    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).floor() as u8
    }
}

/// Receives everything a replay session wants to show.
pub trait Renderer {
    /// Append one message to the visible log. Called in reveal order.
    fn reveal_event(&mut self, event: &ChatEvent);

    /// Remove every message revealed so far.
    fn clear_revealed(&mut self);

    /// Update the progress indicator and time label.
    fn update_progress(&mut self, progress: Progress);

    /// Show a user-facing validation error (for example a bad seek time).
    fn report_validation_error(&mut self, message: &str);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn reveal_event(&mut self, event: &ChatEvent) {
        (**self).reveal_event(event);
    }

    fn clear_revealed(&mut self) {
        (**self).clear_revealed();
    }

    fn update_progress(&mut self, progress: Progress) {
        (**self).update_progress(progress);
    }

    fn report_validation_error(&mut self, message: &str) {
        (**self).report_validation_error(message);
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn reveal_event(&mut self, event: &ChatEvent) {
        (**self).reveal_event(event);
    }

    fn clear_revealed(&mut self) {
        (**self).clear_revealed();
    }

    fn update_progress(&mut self, progress: Progress) {
        (**self).update_progress(progress);
    }

    fn report_validation_error(&mut self, message: &str) {
        (**self).report_validation_error(message);
    }
}

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Reveal(ChatEvent),
    Clear,
    Progress(Progress),
    ValidationError(String),
}

/// A renderer that records every call, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    visible: Vec<ChatEvent>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call in order.
    #[must_use]
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Messages currently on screen (reveals since the last clear).
    #[must_use]
    pub fn visible(&self) -> &[ChatEvent] {
        &self.visible
    }

    /// Number of clear calls.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Clear))
            .count()
    }

    /// Most recent progress snapshot.
    #[must_use]
    pub fn last_progress(&self) -> Option<Progress> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Progress(p) => Some(*p),
            _ => None,
        })
    }

    /// Validation messages in order.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RenderCall::ValidationError(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls but keep the visible log.
    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Renderer for RecordingRenderer {
    fn reveal_event(&mut self, event: &ChatEvent) {
        self.visible.push(event.clone());
        self.calls.push(RenderCall::Reveal(event.clone()));
    }

    fn clear_revealed(&mut self) {
        self.visible.clear();
        self.calls.push(RenderCall::Clear);
    }

    fn update_progress(&mut self, progress: Progress) {
        self.calls.push(RenderCall::Progress(progress));
    }

    fn report_validation_error(&mut self, message: &str) {
        self.calls
            .push(RenderCall::ValidationError(message.to_string()));
    }
}
