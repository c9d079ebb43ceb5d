#![forbid(unsafe_code)]

//! Demo configuration.
//!
//! Loaded from an optional TOML file, then overridden by command-line flags.
//!
//! ```toml
//! initial_text = "untitled"
//! reject_empty = true
//!
//! [stack]
//! max_depth = 50
//! ```

use std::path::Path;

use cmdstack::StackConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{DemoError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// History limits.
    pub stack: StackConfig,
    /// Text value the store starts with.
    pub initial_text: String,
    /// Refuse writes of empty text.
    pub reject_empty: bool,
}

impl DemoConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DemoError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Build the effective configuration: file values first, then flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(text) = &cli.initial {
            self.initial_text.clone_from(text);
        }
        if let Some(max_depth) = cli.max_depth {
            self.stack = StackConfig {
                max_depth: Some(max_depth),
            };
        }
        if cli.reject_empty {
            self.reject_empty = true;
        }
    }
}
