#![forbid(unsafe_code)]

//! Error types for loading, timecode parsing, seeking, and configuration.
//!
//! Nothing here is fatal to a playback session. Record errors drop a single
//! line, seek errors leave the playhead untouched, and the only load failure
//! is an explicit [`OrderPolicy::Reject`](crate::store::OrderPolicy::Reject).

use std::path::PathBuf;

use thiserror::Error;

use crate::timecode::format_time;

/// Failure to turn one log line into a chat event.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid offset {raw:?}")]
    InvalidOffset { raw: String },

    #[error("unsupported record kind: {kind}")]
    Unsupported { kind: String },
}

impl RecordError {
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}

/// Failure to build an [`EventStore`](crate::store::EventStore).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "record on line {line} at {offset_ms}ms precedes the previous record at {previous_ms}ms"
    )]
    OutOfOrder {
        line: usize,
        offset_ms: u64,
        previous_ms: u64,
    },
}

/// Failure to parse `H:MM:SS` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    #[error("expected H:MM:SS, got {input:?}")]
    Format { input: String },

    #[error("{field} must be below 60, got {value}")]
    FieldRange { field: &'static str, value: u64 },

    #[error("timecode {input:?} is too large")]
    Overflow { input: String },
}

/// A rejected seek request. The session state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeekError {
    #[error("invalid seek time: {0}")]
    Timecode(#[from] TimecodeError),

    #[error(
        "seek target {} is past the end of the log ({})",
        format_time(*target_ms),
        format_time(*max_ms)
    )]
    OutOfRange { target_ms: u64, max_ms: u64 },
}

/// Failure to load or validate a [`ReplayConfig`](crate::config::ReplayConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
