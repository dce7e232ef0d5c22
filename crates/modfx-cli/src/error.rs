//! Error types for the CLI's configuration handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating render settings.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read a config file
    #[error("failed to read config '{path}': {source}")]
    ReadConfig {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A setting is outside its accepted range
    #[error("invalid setting '{setting}': {reason}")]
    InvalidSetting {
        /// Name of the offending setting.
        setting: &'static str,
        /// Description of why the value is rejected.
        reason: String,
    },
}

impl CliError {
    /// Create a read config error.
    pub fn read_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::ReadConfig {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid setting error.
    pub fn invalid(setting: &'static str, reason: impl Into<String>) -> Self {
        CliError::InvalidSetting {
            setting,
            reason: reason.into(),
        }
    }
}
