#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

/// Errors that end a demo run.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid log filter {filter:?}: {message}")]
    LogFilter { filter: String, message: String },

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigRead { .. } | Self::ConfigParse(_) | Self::LogFilter { .. } => 2,
            Self::Io(_) => 1,
        }
    }
}
