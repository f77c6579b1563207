//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use lexicache_bundle::CodecError;
use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was not supplied by any source.
    #[error("missing configuration field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path being accessed.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration file was not valid JSON for the expected shape.
    #[error("configuration file is malformed")]
    Json {
        /// Path of the configuration file.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// The canonical bundle failed validation.
    #[error("canonical bundle is invalid")]
    CanonicalBundle {
        /// Path of the canonical bundle.
        path: PathBuf,
        /// Source codec error.
        source: CodecError,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        reason: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: Some(value.into()),
        }
    }
}
