#![forbid(unsafe_code)]

//! Chat events and the record parser seam.
//!
//! A [`ChatEvent`] is one historical message pinned to an offset from the
//! start of the stream. The scheduler only ever looks at `offset_ms`; the
//! author, text, and avatar are carried through to the renderer untouched.
//!
//! Turning a raw log line into a `ChatEvent` is the job of a
//! [`RecordParser`]. The core ships [`NormalizedParser`] for the flat
//! `{offset_ms, author, text, avatar_url}` shape; schema-specific parsers
//! live in their own crates.

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// One timestamped chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Milliseconds since stream start at which the message appeared.
    pub offset_ms: u64,
    /// Display name of the sender.
    pub author: String,
    /// Message body as plain text.
    pub text: String,
    /// Avatar image location. Empty when the source has none.
    #[serde(default)]
    pub avatar_url: String,
}

impl ChatEvent {
    /// Create an event with the given offset and payload.
    pub fn new(
        offset_ms: u64,
        author: impl Into<String>,
        text: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            offset_ms,
            author: author.into(),
            text: text.into(),
            avatar_url: avatar_url.into(),
        }
    }
}

/// Extracts a [`ChatEvent`] from a single non-blank log line.
///
/// Implementations must not panic on malformed input; every failure is a
/// [`RecordError`] that the loader logs and skips.
pub trait RecordParser {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parse one line into an event.
    fn parse_record(&self, line: &str) -> Result<ChatEvent, RecordError>;
}

impl<P: RecordParser + ?Sized> RecordParser for &P {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn parse_record(&self, line: &str) -> Result<ChatEvent, RecordError> {
        (**self).parse_record(line)
    }
}

impl<P: RecordParser + ?Sized> RecordParser for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn parse_record(&self, line: &str) -> Result<ChatEvent, RecordError> {
        (**self).parse_record(line)
    }
}

/// Parser for pre-normalized JSONL produced by this crate's own tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedParser;

impl RecordParser for NormalizedParser {
    fn name(&self) -> &'static str {
        "normalized"
    }

    fn parse_record(&self, line: &str) -> Result<ChatEvent, RecordError> {
        serde_json::from_str(line).map_err(RecordError::Json)
    }
}
