//! Subscriber setup for the binary.
//!
//! Filtering comes from `CHATREPLAY_LOG`, then `RUST_LOG`, then the `-v`
//! count. Output goes to `--log-file` when given. Without a log file,
//! interactive playback installs no subscriber at all, since anything written
//! to stderr would tear the full-screen view.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Args, ValueEnum};
use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::Result;

pub const LOG_ENV: &str = "CHATREPLAY_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log line format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[must_use]
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(args: &LogArgs, interactive: bool) -> Result<()> {
    if interactive && args.log_file.is_none() {
        return Ok(());
    }

    let env_var = if std::env::var_os(LOG_ENV).is_some() {
        LOG_ENV
    } else {
        EnvFilter::DEFAULT_ENV
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(args.verbose).into())
        .with_env_var(env_var)
        .from_env_lossy();

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match &args.log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            build_layer(args.log_format, Mutex::new(file), false)
        }
        None => build_layer(args.log_format, std::io::stderr, true),
    };

    let _ = Registry::default().with(layer.with_filter(filter)).try_init();
    Ok(())
}

fn build_layer<W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true),
        ),
    }
}
