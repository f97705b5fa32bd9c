#![forbid(unsafe_code)]

//! Immutable, offset-ordered event storage for one replay session.
//!
//! [`EventStore::load`] runs a [`RecordParser`] over newline-delimited text,
//! drops lines that fail to parse, and applies an [`OrderPolicy`] to the
//! survivors. The resulting store never changes; loading another log means
//! building another store.
//!
//! # Invariants
//!
//! - Under [`OrderPolicy::Sort`] and [`OrderPolicy::Reject`] events are
//!   non-decreasing by `offset_ms`.
//! - `max_offset_ms` is the largest offset present, or 0 for an empty store.
//! - [`lower_bound`](EventStore::lower_bound) never returns an index past the
//!   last event, even for unsorted input kept with [`OrderPolicy::Trust`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, RecordError};
use crate::event::{ChatEvent, RecordParser};

/// Upper bound on dropped-line samples kept in a [`LoadReport`].
pub const MAX_DROPPED_SAMPLES: usize = 32;

/// What to do when parsed records are not in chronological order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPolicy {
    /// Stable-sort by offset after parsing.
    #[default]
    Sort,
    /// Fail the load at the first record that goes back in time.
    Reject,
    /// Keep file order as-is.
    Trust,
}

/// A line that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    /// 1-based line number in the source text.
    pub line: usize,
    /// Human-readable parse failure.
    pub reason: String,
}

/// Summary of a single [`EventStore::load`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Name of the parser that produced the events.
    pub parser: &'static str,
    /// Lines seen, including blank ones.
    pub total_lines: usize,
    /// Lines that were empty or whitespace.
    pub blank_lines: usize,
    /// Records turned into events.
    pub accepted: usize,
    /// Records that failed to parse.
    pub dropped: usize,
    /// Records whose offset was lower than the one before them.
    pub out_of_order: usize,
    /// First few dropped lines with their reasons.
    pub dropped_samples: Vec<DroppedRecord>,
}

/// The ordered chat events of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStore {
    events: Vec<ChatEvent>,
    max_offset_ms: u64,
}

impl EventStore {
    /// Build a store from already-parsed events, sorting them by offset.
    pub fn from_events(mut events: Vec<ChatEvent>) -> Self {
        events.sort_by_key(|e| e.offset_ms);
        Self::from_ordered(events)
    }

    fn from_ordered(events: Vec<ChatEvent>) -> Self {
        let max_offset_ms = events.iter().map(|e| e.offset_ms).max().unwrap_or(0);
        Self {
            events,
            max_offset_ms,
        }
    }

    /// Parse newline-delimited records into a store.
    ///
    /// Blank lines are skipped silently. Lines the parser rejects are logged
    /// and counted in the returned [`LoadReport`]; they never abort the load.
    /// The only error is an out-of-order record under
    /// [`OrderPolicy::Reject`].
    pub fn load<P: RecordParser>(
        raw: &str,
        parser: &P,
        policy: OrderPolicy,
    ) -> Result<(Self, LoadReport), LoadError> {
        let mut report = LoadReport {
            parser: parser.name(),
            ..LoadReport::default()
        };
        let mut events = Vec::new();
        let mut previous_ms: Option<u64> = None;

        for (idx, line) in raw.lines().enumerate() {
            let line_no = idx + 1;
            report.total_lines += 1;
            if line.trim().is_empty() {
                report.blank_lines += 1;
                continue;
            }

            let event = match parser.parse_record(line) {
                Ok(event) => event,
                Err(err) => {
                    record_drop(&mut report, line_no, &err, parser.name());
                    continue;
                }
            };

            if let Some(prev) = previous_ms
                && event.offset_ms < prev
            {
                report.out_of_order += 1;
                if policy == OrderPolicy::Reject {
                    return Err(LoadError::OutOfOrder {
                        line: line_no,
                        offset_ms: event.offset_ms,
                        previous_ms: prev,
                    });
                }
            }
            previous_ms = Some(event.offset_ms);
            events.push(event);
        }

        report.accepted = events.len();

        let store = if report.out_of_order > 0 && policy == OrderPolicy::Sort {
            tracing::warn!(
                out_of_order = report.out_of_order,
                "chat log is not chronological; sorting by offset"
            );
            Self::from_events(events)
        } else {
            if report.out_of_order > 0 {
                tracing::warn!(
                    out_of_order = report.out_of_order,
                    "chat log is not chronological; keeping file order"
                );
            }
            Self::from_ordered(events)
        };

        tracing::info!(
            parser = report.parser,
            accepted = report.accepted,
            dropped = report.dropped,
            blank = report.blank_lines,
            max_offset_ms = store.max_offset_ms,
            "chat log loaded"
        );

        Ok((store, report))
    }

    /// Read a file from disk and [`load`](Self::load) it.
    pub fn load_file<P: RecordParser>(
        path: impl AsRef<Path>,
        parser: &P,
        policy: OrderPolicy,
    ) -> Result<(Self, LoadReport), LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&raw, parser, policy)
    }

    /// All events in playback order.
    #[must_use]
    pub fn events(&self) -> &[ChatEvent] {
        &self.events
    }

    /// Event at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChatEvent> {
        self.events.get(index)
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Largest offset in the store, or 0 when empty.
    #[must_use]
    pub const fn max_offset_ms(&self) -> u64 {
        self.max_offset_ms
    }

    /// Index of the first event whose offset is at least `target_ms`.
    ///
    /// When every event is earlier than the target the result is clamped to
    /// the last index; an empty store yields 0.
    #[must_use]
    pub fn lower_bound(&self, target_ms: u64) -> usize {
        let idx = self.events.partition_point(|e| e.offset_ms < target_ms);
        idx.min(self.events.len().saturating_sub(1))
    }
}

fn record_drop(report: &mut LoadReport, line: usize, err: &RecordError, parser: &'static str) {
    report.dropped += 1;
    match err {
        RecordError::Unsupported { kind } => {
            tracing::debug!(line, parser, kind = %kind, "skipping non-message record");
        }
        _ => {
            tracing::warn!(line, parser, error = %err, "dropping unparsable chat record");
        }
    }
    if report.dropped_samples.len() < MAX_DROPPED_SAMPLES {
        report.dropped_samples.push(DroppedRecord {
            line,
            reason: err.to_string(),
        });
    }
}
