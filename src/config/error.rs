//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A task interval is zero or too large to schedule.
    #[error("task '{0}' has an invalid interval")]
    InvalidInterval(String),

    /// Failed to read a schedule file.
    #[error("failed to read file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),
}
