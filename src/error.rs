//src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SangerError>;

/// Errors raised by decoders, loaders and configuration checks.
///
/// Degenerate data (empty reads, empty consensus, empty reference set) is
/// never an error; it has defined outputs instead.
#[derive(Error, Debug)]
pub enum SangerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file '{path}': {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Sequence length {sequence} does not match quality length {quality}")]
    LengthMismatch { sequence: usize, quality: usize },

    #[error("Duplicate reference id '{id}' in '{path}'")]
    DuplicateReference { id: String, path: PathBuf },

    #[error("Invalid configuration value '{parameter}': {reason}")]
    InvalidConfig { parameter: String, reason: String },

    #[error("Cannot parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SangerError {
    pub(crate) fn invalid_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SangerError::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(parameter: &str, reason: impl Into<String>) -> Self {
        SangerError::InvalidConfig {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}
