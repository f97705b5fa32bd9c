//! Full-screen terminal output.
//!
//! [`TerminalRenderer`] keeps the visible chat backlog and last progress
//! report in memory and repaints on demand; it never touches the terminal
//! from inside the [`Renderer`] callbacks. [`TerminalGuard`] owns raw mode
//! and the alternate screen.
//!
//! # Invariants
//!
//! - The terminal is restored when the guard drops, including during panic
//!   unwinding. A panic hook covers the `panic = "abort"` release profile.
//! - The backlog never exceeds [`MAX_BACKLOG`] messages; the oldest go first.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::OnceLock;

use chatreplay_core::{ChatEvent, PlaybackState, PlaybackStatus, Progress, Renderer, format_time};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Messages kept for scrollback.
pub const MAX_BACKLOG: usize = 2_000;

const HELP: &str = "space play/pause  r restart  g seek  +/- speed  q quit";

/// In-memory chat view painted with crossterm.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    backlog: VecDeque<ChatEvent>,
    progress: Option<Progress>,
    notice: Option<String>,
    dirty: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn backlog(&self) -> &VecDeque<ChatEvent> {
        &self.backlog
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Repaint the whole screen.
    ///
    /// Layout, top to bottom: status header, as many of the newest messages
    /// as fit, progress bar, and a footer holding the seek prompt, the last
    /// validation error, or key help.
    pub fn draw<W: Write>(
        &mut self,
        out: &mut W,
        status: &PlaybackStatus,
        prompt: Option<&str>,
        (width, height): (u16, u16),
    ) -> io::Result<()> {
        let cols = usize::from(width.max(1));
        let rows = height.max(3);

        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        queue!(
            out,
            SetAttribute(Attribute::Reverse),
            Print(pad(&header(status), cols)),
            SetAttribute(Attribute::Reset)
        )?;

        let chat_rows = usize::from(rows - 3);
        let skip = self.backlog.len().saturating_sub(chat_rows);
        for (row, event) in (1u16..).zip(self.backlog.iter().skip(skip)) {
            queue!(out, MoveTo(0, row), Print(fit(&chat_line(event), cols)))?;
        }

        let progress = self.progress.unwrap_or(status.progress);
        queue!(out, MoveTo(0, rows - 2), Print(progress_bar(&progress, cols)))?;

        let footer = match (prompt, &self.notice) {
            (Some(buffer), _) => format!("seek to (H:MM:SS): {buffer}"),
            (None, Some(notice)) => format!("! {notice}"),
            (None, None) => HELP.to_string(),
        };
        queue!(out, MoveTo(0, rows - 1), Print(fit(&footer, cols)))?;
        out.flush()?;

        self.dirty = false;
        Ok(())
    }
}

impl Renderer for TerminalRenderer {
    fn reveal_event(&mut self, event: &ChatEvent) {
        if self.backlog.len() == MAX_BACKLOG {
            self.backlog.pop_front();
        }
        self.backlog.push_back(event.clone());
        self.dirty = true;
    }

    fn clear_revealed(&mut self) {
        self.backlog.clear();
        self.dirty = true;
    }

    fn update_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
        self.dirty = true;
    }

    fn report_validation_error(&mut self, message: &str) {
        self.notice = Some(message.to_string());
        self.dirty = true;
    }
}

fn header(status: &PlaybackStatus) -> String {
    let state = match status.state {
        PlaybackState::Playing => "> playing",
        PlaybackState::Paused => "|| paused",
        PlaybackState::Stopped => "[] stopped",
    };
    format!(
        " chatreplay  {state}  {}x  {}/{} messages",
        status.speed, status.cursor, status.total_events
    )
}

fn chat_line(event: &ChatEvent) -> String {
    format!(
        "[{}] {}: {}",
        format_time(event.offset_ms),
        event.author,
        event.text
    )
}

fn progress_bar(progress: &Progress, cols: usize) -> String {
    let label = format!(" {} {:>3}%", progress.label(), progress.percent());
    let bar_width = cols.saturating_sub(label.width() + 2);
    let filled = ((progress.fraction * bar_width as f64).round() as usize).min(bar_width);
    let bar = format!(
        "[{}{}]{label}",
        "#".repeat(filled),
        "-".repeat(bar_width - filled)
    );
    fit(&bar, cols)
}

/// Truncate `text` to at most `cols` terminal columns.
///
/// Control characters become spaces. A wide character that would straddle
/// the last column is dropped whole.
fn fit(text: &str, cols: usize) -> String {
    let mut fitted = String::new();
    let mut used = 0;
    for c in text.chars() {
        let c = if c.is_control() { ' ' } else { c };
        let width = c.width().unwrap_or(0);
        if used + width > cols {
            break;
        }
        fitted.push(c);
        used += width;
    }
    fitted
}

fn pad(text: &str, cols: usize) -> String {
    let fitted = fit(text, cols);
    let used = fitted.width();
    format!("{fitted}{}", " ".repeat(cols.saturating_sub(used)))
}

/// Raw mode plus alternate screen for the lifetime of the guard.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        tracing::debug!("terminal entered raw mode");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
        tracing::debug!("terminal restored");
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

fn restore_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = stdout.flush();
}
