//! Error types for map document loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading map documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (or JSON) parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Map specification rejected while converting or building.
    #[error(transparent)]
    Map(#[from] lutmap_core::Error),

    /// Document file not found.
    #[error("document not found: {path}")]
    NotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// A store key is not a string or contains `.`.
    #[error("invalid key: {key}")]
    InvalidKey {
        /// The rejected key, as written.
        key: String,
    },

    /// A document field has the wrong kind of value.
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Description of what's wrong.
        reason: String,
    },

    /// No map section with the requested name.
    #[error("map not found: {name}")]
    MapNotFound {
        /// Requested name.
        name: String,
    },
}

impl ConfigError {
    /// Creates an [`ConfigError::InvalidField`] error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
