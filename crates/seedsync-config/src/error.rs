//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read configuration file {}", path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File being read.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The config file was not valid YAML for the expected shape.
    #[error("failed to parse configuration file {}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Source YAML error.
        source: serde_yaml::Error,
    },
    /// A required field was absent from both the file and the environment.
    #[error("missing required configuration field '{field}'")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// An environment override could not be parsed.
    #[error("invalid environment override {name}: {reason}")]
    InvalidEnv {
        /// Variable name.
        name: String,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.into()),
            reason,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
