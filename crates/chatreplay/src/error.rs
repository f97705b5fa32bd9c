use chatreplay_core::{ConfigError, LoadError, SeekError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("seek failed: {0}")]
    Seek(#[from] SeekError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::InvalidArgument { .. } | Self::Config(_) | Self::Seek(_) => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
