use std::io::{self, IsTerminal};
use std::path::PathBuf;

use chatreplay_core::{Clock, MonotonicClock, Renderer, ReplayConfig, ReplaySession};
use clap::Args;

use crate::app::App;
use crate::error::{CliError, Result};
use crate::format::{Format, OrderArg, load_log};
use crate::plain::{PlainRenderer, run_plain};
use crate::terminal::TerminalRenderer;

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    /// Chat log to replay.
    pub file: PathBuf,

    /// Record format of the log.
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    pub format: Format,

    /// Playback speed multiplier.
    #[arg(long)]
    pub speed: Option<f64>,

    /// Start position as H:MM:SS.
    #[arg(long)]
    pub start: Option<String>,

    /// Handling of records that go back in time.
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// TOML or JSON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print messages as lines instead of taking over the terminal.
    #[arg(long)]
    pub plain: bool,

    /// Open paused instead of playing immediately.
    #[arg(long)]
    pub paused: bool,

    /// With plain output, also print a progress line on every update.
    #[arg(long)]
    pub progress: bool,
}

impl PlayArgs {
    /// Whether this invocation will take over the terminal.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !self.plain && io::stdout().is_terminal()
    }
}

/// Load the config file, if any, and apply command-line overrides on top.
pub fn resolve_config(args: &PlayArgs) -> Result<ReplayConfig> {
    let mut config = match &args.config {
        Some(path) => ReplayConfig::from_file(path)?,
        None => ReplayConfig::default(),
    };
    if let Some(speed) = args.speed {
        config.playback.speed = speed;
    }
    if let Some(start) = &args.start {
        config.playback.start = Some(start.clone());
    }
    if let Some(order) = args.order {
        config.load.order = order.into();
    }
    if args.paused {
        config.playback.autoplay = false;
    }
    Ok(config.validated()?)
}

pub fn run_play(args: PlayArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let (store, report) = load_log(&args.file, args.format, config.load.order)?;
    tracing::info!(
        path = %args.file.display(),
        parser = report.parser,
        events = store.len(),
        dropped = report.dropped,
        "replay ready"
    );

    if args.is_interactive() {
        let clock = MonotonicClock::new();
        let session = ReplaySession::with_config(store, clock, TerminalRenderer::new(), &config);
        let mut app = App::new(session);
        start(app.session_mut(), &config)?;
        app.run()?;
        return Ok(());
    }

    if args.paused {
        return Err(CliError::invalid(
            "--paused needs an interactive terminal; drop --plain or --paused",
        ));
    }
    // Nothing can resume a plain session, so it always plays.
    let mut config = config;
    config.playback.autoplay = true;
    let renderer = PlainRenderer::new(io::stdout().lock()).with_progress(args.progress);
    let mut session = ReplaySession::with_config(store, MonotonicClock::new(), renderer, &config);
    start(&mut session, &config)?;
    run_plain(&mut session, std::thread::sleep)?;
    Ok(())
}

/// Seek to the configured start, then play or pause per `autoplay`.
pub fn start<C: Clock, R: Renderer>(
    session: &mut ReplaySession<C, R>,
    config: &ReplayConfig,
) -> Result<()> {
    match &config.playback.start {
        Some(start) => {
            session.seek_to_str(start)?;
            if !config.playback.autoplay {
                session.pause();
            }
        }
        None if config.playback.autoplay => session.play(),
        None => {}
    }
    Ok(())
}
