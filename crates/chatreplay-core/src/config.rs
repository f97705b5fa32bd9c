#![forbid(unsafe_code)]

//! Replay configuration as data.
//!
//! All tunables live in one [`ReplayConfig`] that can be loaded from TOML or
//! JSON. Every field has a default, so an empty file (or no file at all)
//! gives the stock behavior.
//!
//! ```toml
//! [timing]
//! reveal_interval_ms = 100
//! progress_interval_ms = 500
//!
//! [playback]
//! speed = 1.0
//! autoplay = true
//! start = "0:10:00"
//!
//! [load]
//! order = "sort"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::OrderPolicy;
use crate::timecode::parse_time;

/// Fastest allowed playback multiplier.
pub const MAX_SPEED: f64 = 64.0;

/// Top-level replay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Reveal and progress cadences.
    pub timing: TimingConfig,
    /// Initial playback behavior.
    pub playback: PlaybackConfig,
    /// Log loading behavior.
    pub load: LoadConfig,
}

/// Cadences of the two repeating tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Milliseconds between reveal passes.
    pub reveal_interval_ms: u64,
    /// Milliseconds between progress reports.
    pub progress_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: 100,
            progress_interval_ms: 500,
        }
    }
}

/// How playback begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Simulated milliseconds per wall-clock millisecond.
    pub speed: f64,
    /// Start playing as soon as the log is loaded.
    pub autoplay: bool,
    /// Optional `H:MM:SS` position to seek to on start.
    pub start: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            autoplay: true,
            start: None,
        }
    }
}

/// How the chat log is turned into an event store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Handling of out-of-order records.
    pub order: OrderPolicy,
}

impl ReplayConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a file, choosing JSON for `.json` and TOML otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_toml_file(path)
        }
    }

    /// Validate all parameters.
    ///
    /// Returns every violation found. An empty list means the config is
    /// valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.timing.reveal_interval_ms == 0 {
            errors.push("timing.reveal_interval_ms must be > 0".into());
        }
        if self.timing.progress_interval_ms == 0 {
            errors.push("timing.progress_interval_ms must be > 0".into());
        }

        let speed = self.playback.speed;
        if !speed.is_finite() || speed <= 0.0 || speed > MAX_SPEED {
            errors.push(format!(
                "playback.speed must be in (0, {MAX_SPEED}], got {speed}"
            ));
        }

        if let Some(start) = &self.playback.start
            && let Err(err) = parse_time(start)
        {
            errors.push(format!("playback.start: {err}"));
        }

        errors
    }

    /// Return `self` if valid, or every violation as one error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ReplayConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.timing.reveal_interval_ms, 100);
        assert_eq!(config.timing.progress_interval_ms, 500);
        assert_eq!(config.playback.speed, 1.0);
        assert_eq!(config.load.order, OrderPolicy::Sort);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(
            ReplayConfig::from_toml_str("").unwrap(),
            ReplayConfig::default()
        );
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = ReplayConfig::from_toml_str(
            r#"
            [timing]
            progress_interval_ms = 1000

            [load]
            order = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.reveal_interval_ms, 100);
        assert_eq!(config.timing.progress_interval_ms, 1000);
        assert_eq!(config.load.order, OrderPolicy::Reject);
    }

    #[test]
    fn json_loads_playback_section() {
        let config = ReplayConfig::from_json_str(
            r#"{"playback": {"speed": 2.5, "autoplay": false, "start": "0:05:00"}}"#,
        )
        .unwrap();
        assert_eq!(config.playback.speed, 2.5);
        assert!(!config.playback.autoplay);
        assert_eq!(config.playback.start.as_deref(), Some("0:05:00"));
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut config = ReplayConfig::default();
        config.timing.reveal_interval_ms = 0;
        config.timing.progress_interval_ms = 0;
        config.playback.speed = f64::NAN;
        config.playback.start = Some("soon".into());
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn validated_rejects_excessive_speed() {
        let mut config = ReplayConfig::default();
        config.playback.speed = MAX_SPEED * 2.0;
        assert!(matches!(config.validated(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_order_is_a_parse_error() {
        let err = ReplayConfig::from_toml_str("[load]\norder = \"shuffle\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("replay.toml");
        std::fs::write(&toml_path, "[playback]\nspeed = 4.0\n").unwrap();
        assert_eq!(ReplayConfig::from_file(&toml_path).unwrap().playback.speed, 4.0);

        let json_path = dir.path().join("replay.JSON");
        let mut file = std::fs::File::create(&json_path).unwrap();
        writeln!(file, r#"{{"playback": {{"speed": 8.0}}}}"#).unwrap();
        assert_eq!(ReplayConfig::from_file(&json_path).unwrap().playback.speed, 8.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReplayConfig::from_file("/nonexistent/chatreplay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
