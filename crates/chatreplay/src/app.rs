//! Interactive playback: key handling and the terminal event loop.
//!
//! The loop blocks on input for at most the time until the session's next
//! timer deadline, pumps the session, and repaints only when the renderer
//! reports a change.

use std::io::{self, Write};
use std::time::Duration;

use chatreplay_core::{Clock, ReplaySession};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::terminal::{TerminalGuard, TerminalRenderer};

/// Longest input wait while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Speeds reachable with `+` and `-`.
pub const SPEED_STEPS: [f64; 9] = [0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 4.0, 8.0, 16.0];

const MAX_PROMPT_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    SeekPrompt(String),
}

pub struct App<C: Clock> {
    session: ReplaySession<C, TerminalRenderer>,
    mode: Mode,
}

impl<C: Clock> App<C> {
    pub fn new(session: ReplaySession<C, TerminalRenderer>) -> Self {
        Self {
            session,
            mode: Mode::Normal,
        }
    }

    #[must_use]
    pub fn session(&self) -> &ReplaySession<C, TerminalRenderer> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ReplaySession<C, TerminalRenderer> {
        &mut self.session
    }

    /// Text typed into the seek prompt, when it is open.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        match &self.mode {
            Mode::Normal => None,
            Mode::SeekPrompt(buffer) => Some(buffer),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        self.session.renderer_mut().mark_dirty();

        match &mut self.mode {
            Mode::SeekPrompt(buffer) => {
                match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() || c == ':' => {
                        if buffer.len() < MAX_PROMPT_LEN {
                            buffer.push(c);
                        }
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                    }
                    KeyCode::Enter => {
                        let input = std::mem::take(buffer);
                        self.mode = Mode::Normal;
                        if self.session.seek_to_str(&input).is_ok() {
                            self.session.renderer_mut().clear_notice();
                        }
                    }
                    KeyCode::Esc => self.mode = Mode::Normal,
                    _ => {}
                }
                Action::Continue
            }
            Mode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char(' ') => {
                    self.session.renderer_mut().clear_notice();
                    self.session.toggle();
                    Action::Continue
                }
                KeyCode::Char('r') => {
                    self.session.renderer_mut().clear_notice();
                    self.session.restart();
                    Action::Continue
                }
                KeyCode::Char('g') => {
                    self.mode = Mode::SeekPrompt(String::new());
                    Action::Continue
                }
                KeyCode::Char('+' | '=') => {
                    self.step_speed(true);
                    Action::Continue
                }
                KeyCode::Char('-' | '_') => {
                    self.step_speed(false);
                    Action::Continue
                }
                _ => Action::Continue,
            },
        }
    }

    fn step_speed(&mut self, faster: bool) {
        let current = self.session.speed();
        let next = if faster {
            SPEED_STEPS.iter().copied().find(|&s| s > current)
        } else {
            SPEED_STEPS.iter().rev().copied().find(|&s| s < current)
        };
        if let Some(speed) = next {
            self.session.set_speed(speed);
        }
    }

    /// Repaint if anything changed since the last draw.
    pub fn draw<W: Write>(&mut self, out: &mut W, size: (u16, u16)) -> io::Result<()> {
        if !self.session.renderer().is_dirty() {
            return Ok(());
        }
        let status = self.session.status();
        let prompt = match &self.mode {
            Mode::Normal => None,
            Mode::SeekPrompt(buffer) => Some(buffer.as_str()),
        };
        self.session
            .renderer_mut()
            .draw(out, &status, prompt, size)
    }

    /// Take over the terminal until the user quits.
    pub fn run(mut self) -> io::Result<()> {
        let _guard = TerminalGuard::enter()?;
        let mut stdout = io::stdout();
        let mut size = crossterm::terminal::size()?;
        tracing::info!(cols = size.0, rows = size.1, "interactive playback started");

        loop {
            self.session.pump();
            self.draw(&mut stdout, size)?;

            let timeout = self
                .session
                .time_until_deadline()
                .map_or(IDLE_POLL, |wait| wait.min(IDLE_POLL));
            if !event::poll(timeout)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    if self.handle_key(key) == Action::Quit {
                        break;
                    }
                }
                Event::Resize(cols, rows) => {
                    size = (cols, rows);
                    self.session.renderer_mut().mark_dirty();
                }
                _ => {}
            }
        }

        tracing::info!(
            elapsed_ms = self.session.elapsed_ms(),
            cursor = self.session.cursor(),
            "interactive playback ended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatreplay_core::{ChatEvent, EventStore, ManualClock, PlaybackState};
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (App<ManualClock>, ManualClock) {
        let store = EventStore::from_events(vec![
            ChatEvent::new(0, "ann", "a", ""),
            ChatEvent::new(2_000, "bob", "b", ""),
            ChatEvent::new(60_000, "cid", "c", ""),
        ]);
        let clock = ManualClock::new();
        let session = ReplaySession::new(store, clock.clone(), TerminalRenderer::new());
        (App::new(session), clock)
    }

    fn type_seek(app: &mut App<ManualClock>, text: &str) {
        app.handle_key(key(KeyCode::Char('g')));
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn space_toggles_playback() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session().state(), PlaybackState::Playing);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session().state(), PlaybackState::Paused);
    }

    #[test]
    fn quit_keys() {
        let (mut app, _) = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _) = app();
        let release = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        app.handle_key(release);
        assert_eq!(app.session().state(), PlaybackState::Stopped);
    }

    #[test]
    fn seek_prompt_seeks_and_plays() {
        let (mut app, _) = app();
        type_seek(&mut app, "0:00:02");
        assert!(app.prompt().is_none());
        assert_eq!(app.session().cursor(), 1);
        assert_eq!(app.session().state(), PlaybackState::Playing);
        app.session_mut().pump();
        assert_eq!(app.session().renderer().backlog()[0].author, "bob");
    }

    #[test]
    fn bad_seek_shows_notice_and_keeps_state() {
        let (mut app, _) = app();
        type_seek(&mut app, "9:00:00");
        assert_eq!(app.session().state(), PlaybackState::Stopped);
        assert!(app.session().renderer().notice().is_some());

        // The next successful action clears it.
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.session().renderer().notice().is_none());
    }

    #[test]
    fn prompt_filters_input_and_supports_editing() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Char('g')));
        for c in "0:x0a:01".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.prompt(), Some("0:0:01"));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.prompt(), Some("0:0:0"));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.prompt().is_none());
        assert_eq!(app.session().state(), PlaybackState::Stopped);
    }

    #[test]
    fn speed_keys_step_through_presets() {
        let (mut app, _) = app();
        app.handle_key(key(KeyCode::Char('+')));
        assert_eq!(app.session().speed(), 1.5);
        app.handle_key(key(KeyCode::Char('-')));
        app.handle_key(key(KeyCode::Char('-')));
        assert_eq!(app.session().speed(), 0.75);
        for _ in 0..20 {
            app.handle_key(key(KeyCode::Char('-')));
        }
        assert_eq!(app.session().speed(), 0.25);
    }

    #[test]
    fn restart_key_clears_view() {
        let (mut app, clock) = app();
        app.handle_key(key(KeyCode::Char(' ')));
        clock.advance_ms(2_500);
        app.session_mut().pump();
        assert_eq!(app.session().renderer().backlog().len(), 2);
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.session().renderer().backlog().is_empty());
        assert_eq!(app.session().state(), PlaybackState::Stopped);
    }

    #[test]
    fn draw_skips_clean_frames() {
        let (mut app, _) = app();
        let mut first = Vec::new();
        app.draw(&mut first, (40, 10)).unwrap();
        assert!(!first.is_empty());
        let mut second = Vec::new();
        app.draw(&mut second, (40, 10)).unwrap();
        assert!(second.is_empty());
    }
}
