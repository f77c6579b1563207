//! # Design
//!
//! - Structured, constant-message errors for bundle parsing and reshaping.
//! - Carry the offending path so a broken bundle can be located from logs alone.
//! - A codec failure is fatal for one bundle only; callers decide the fallback.

use thiserror::Error;

/// Result alias for bundle operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while parsing, flattening, or rebuilding translation trees.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Two siblings share the same name in the authored source.
    #[error("duplicate sibling key")]
    DuplicateKey {
        /// Dot path of the duplicated node.
        path: String,
    },
    /// A path segment was empty or contained the `.` separator.
    #[error("invalid key segment")]
    InvalidSegment {
        /// Dot path (or raw key) containing the segment.
        path: String,
        /// Offending segment.
        segment: String,
    },
    /// A leaf held something other than a string or null.
    #[error("non-string leaf")]
    NonStringLeaf {
        /// Dot path of the leaf.
        path: String,
        /// JSON kind found at the leaf.
        kind: &'static str,
    },
    /// The bundle root was not an object.
    #[error("bundle root must be an object")]
    RootNotBranch,
    /// One flat key is a strict prefix of another (`a` and `a.b`).
    #[error("key path collision")]
    PathCollision {
        /// Key being inserted when the collision was detected.
        key: String,
        /// Existing path that conflicts with `key`.
        existing: String,
    },
    /// Locale tag could not be normalised.
    #[error("invalid locale code")]
    InvalidLocale {
        /// Raw tag supplied by the caller.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The bundle payload was not valid JSON.
    #[error("bundle json failure")]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_stay_constant_while_context_is_carried() {
        let err = CodecError::PathCollision {
            key: "a.b".to_string(),
            existing: "a".to_string(),
        };
        assert_eq!(err.to_string(), "key path collision");

        let json = serde_json::from_str::<serde_json::Value>("{").err();
        let Some(source) = json else {
            panic!("expected invalid json");
        };
        let err = CodecError::Json {
            operation: "parse_bundle",
            source,
        };
        assert_eq!(err.to_string(), "bundle json failure");
        assert!(err.source().is_some());
    }
}
