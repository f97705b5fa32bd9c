//! Chat log format selection and loading.

use std::path::{Path, PathBuf};

use chatreplay_core::{
    EventStore, LoadError, LoadReport, NormalizedParser, OrderPolicy, RecordParser,
};
use chatreplay_livechat::LiveChatParser;
use clap::ValueEnum;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Probe the first non-blank line.
    #[default]
    Auto,
    /// YouTube `live_chat.json` export.
    #[value(name = "live-chat")]
    LiveChat,
    /// One `{offset_ms, author, text, avatar_url}` object per line.
    Normalized,
}

impl Format {
    /// Resolve `Auto` against the log contents. Concrete formats pass through.
    #[must_use]
    pub fn resolve(self, raw: &str) -> Self {
        if self != Self::Auto {
            return self;
        }
        match raw.lines().find(|line| !line.trim().is_empty()) {
            Some(line) if LiveChatParser::looks_like(line) => Self::LiveChat,
            _ => Self::Normalized,
        }
    }

    /// Parser for a resolved format. `Auto` falls back to normalized.
    #[must_use]
    pub fn parser(self) -> Box<dyn RecordParser> {
        match self {
            Self::LiveChat => Box::new(LiveChatParser),
            Self::Auto | Self::Normalized => Box::new(NormalizedParser),
        }
    }
}

/// Out-of-order handling as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Sort,
    Reject,
    Trust,
}

impl From<OrderArg> for OrderPolicy {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Sort => Self::Sort,
            OrderArg::Reject => Self::Reject,
            OrderArg::Trust => Self::Trust,
        }
    }
}

/// Read `path`, pick a parser, and build the event store.
pub fn load_log(
    path: &Path,
    format: Format,
    order: OrderPolicy,
) -> Result<(EventStore, LoadReport)> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    let format = format.resolve(&raw);
    tracing::debug!(path = %path.display(), ?format, ?order, "loading chat log");
    Ok(EventStore::load(&raw, &format.parser(), order)?)
}
