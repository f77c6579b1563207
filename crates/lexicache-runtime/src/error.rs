//! Error types for resolver operations.

use lexicache_bundle::CodecError;
use thiserror::Error;

/// Result alias for resolver operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by [`crate::Resolver`].
///
/// Fill and persistence failures are recovered internally and reported
/// through events; only caller mistakes reach this type.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The requested locale tag failed validation.
    #[error("invalid locale")]
    InvalidLocale {
        /// Tag supplied by the caller.
        value: String,
        /// Underlying validation error.
        source: CodecError,
    },
}
