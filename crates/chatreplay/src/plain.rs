//! Line-oriented output for pipes and non-interactive terminals.

use std::io::{self, Write};
use std::time::Duration;

use chatreplay_core::{ChatEvent, Clock, Progress, Renderer, ReplaySession, format_time};

/// Upper bound on a single idle sleep between pumps.
const MAX_IDLE: Duration = Duration::from_millis(250);

/// Writes each revealed message as `[H:MM:SS] author: text`.
///
/// A clear prints a `---` separator, but only after at least one message
/// since the previous separator. [`Renderer`] methods cannot fail, so the first write error is parked and
/// surfaced through [`take_error`](Self::take_error).
#[derive(Debug)]
pub struct PlainRenderer<W: Write> {
    out: W,
    show_progress: bool,
    revealed_since_clear: bool,
    error: Option<io::Error>,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_progress: false,
            revealed_since_clear: false,
            error: None,
        }
    }

    /// Also print a `# elapsed / total (pct%)` line on every progress update.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_fmt(args).and_then(|()| self.out.flush()) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn reveal_event(&mut self, event: &ChatEvent) {
        self.revealed_since_clear = true;
        self.emit(format_args!(
            "[{}] {}: {}\n",
            format_time(event.offset_ms),
            event.author,
            event.text
        ));
    }

    fn clear_revealed(&mut self) {
        if std::mem::take(&mut self.revealed_since_clear) {
            self.emit(format_args!("---\n"));
        }
    }

    fn update_progress(&mut self, progress: Progress) {
        if self.show_progress {
            self.emit(format_args!(
                "# {} ({}%)\n",
                progress.label(),
                progress.percent()
            ));
        }
    }

    fn report_validation_error(&mut self, message: &str) {
        self.emit(format_args!("! {message}\n"));
    }
}

/// Pump `session` until every event has been revealed.
///
/// `sleep` is called with the time until the next timer deadline; tests pass
/// a closure that advances a manual clock.
pub fn run_plain<C, W>(
    session: &mut ReplaySession<C, PlainRenderer<W>>,
    mut sleep: impl FnMut(Duration),
) -> io::Result<()>
where
    C: Clock,
    W: Write,
{
    loop {
        session.pump();
        if let Some(err) = session.renderer_mut().take_error() {
            if err.kind() == io::ErrorKind::BrokenPipe {
                tracing::debug!("output closed; stopping playback");
                return Ok(());
            }
            return Err(err);
        }
        if session.status().is_exhausted() || !session.is_playing() {
            break;
        }
        let wait = session.time_until_deadline().unwrap_or(MAX_IDLE).min(MAX_IDLE);
        sleep(wait);
    }
    let progress = session.report_progress();
    tracing::info!(elapsed_ms = progress.elapsed_ms, "plain playback finished");
    match session.renderer_mut().take_error() {
        Some(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err),
        _ => Ok(()),
    }
}
