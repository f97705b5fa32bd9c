#![forbid(unsafe_code)]

//! Chat replay core.
//!
//! Replays a recorded live-stream chat log against a simulated clock. The
//! crate is split along the two pieces that matter:
//!
//! - [`EventStore`] - the immutable, offset-ordered messages of one log,
//!   built by running a [`RecordParser`] over newline-delimited records.
//! - [`ReplaySession`] - the playhead scheduler. It owns simulated time, the
//!   play/pause state, and the cursor into the store, and calls a
//!   [`Renderer`] for every newly due message and every progress update.
//!
//! Everything else is support: [`timecode`] for `H:MM:SS`, [`Clock`] so
//! tests can drive time by hand, [`RepeatingTask`] for the cancelable reveal
//! and progress cadences, and [`ReplayConfig`] for tunables.
//!
//! # Role in chatreplay
//! `chatreplay-core` has no terminal or file-format knowledge beyond the
//! flat [`NormalizedParser`]. Schema parsers live in `chatreplay-livechat`;
//! drawing lives in the `chatreplay` binary.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod playhead;
pub mod renderer;
pub mod session;
pub mod store;
pub mod timecode;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{LoadConfig, PlaybackConfig, ReplayConfig, TimingConfig};
pub use error::{ConfigError, LoadError, RecordError, SeekError, TimecodeError};
pub use event::{ChatEvent, NormalizedParser, RecordParser};
pub use playhead::{PlaybackState, Playhead};
pub use renderer::{Progress, RecordingRenderer, RenderCall, Renderer};
pub use session::{PlaybackStatus, PumpOutcome, ReplaySession};
pub use store::{DroppedRecord, EventStore, LoadReport, OrderPolicy};
pub use timecode::{format_time, parse_time};
pub use timer::RepeatingTask;
