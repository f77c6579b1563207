//! # Design
//!
//! - Persistence failures never escape to end users; callers log and retry.
//! - Keep the storage key and path on the error so retries are traceable.

use std::io;
use std::path::PathBuf;

use lexicache_bundle::CodecError;
use thiserror::Error;

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by key-value stores and the registry snapshot codec.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("store io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The registry envelope could not be encoded or decoded.
    #[error("store serialisation failure")]
    Serialize {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A persisted bundle failed tree validation.
    #[error("persisted bundle is invalid")]
    Codec {
        /// Locale whose bundle was rejected.
        locale: String,
        /// Underlying codec error.
        source: CodecError,
    },
    /// A storage key contained characters the backend cannot represent.
    #[error("invalid storage key")]
    InvalidKey {
        /// Offending key.
        key: String,
    },
    /// Backend reported a failure that has no richer representation.
    #[error("store backend failure")]
    Backend {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Backend-supplied detail.
        message: String,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
