#![forbid(unsafe_code)]

//! The `chatreplay` command-line tool.
//!
//! `chatreplay play` replays a chat log full-screen (or as plain lines with
//! `--plain`); `chatreplay inspect` loads one and summarizes what parsed.

pub mod app;
pub mod cli;
pub mod error;
pub mod format;
pub mod inspect;
pub mod logging;
pub mod plain;
pub mod play;
pub mod terminal;

pub use cli::run_from_env;
pub use error::{CliError, Result};
