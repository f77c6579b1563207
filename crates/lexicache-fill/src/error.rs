//! # Design
//!
//! - Every variant means the whole batch failed; there is no partial success.
//! - Keep messages constant and carry status/lengths as fields for logs.

use thiserror::Error;

/// Result alias for fill operations.
pub type FillResult<T> = Result<T, FillError>;

/// Errors produced while requesting translations from a provider.
#[derive(Debug, Error)]
pub enum FillError {
    /// The request could not be sent or timed out.
    #[error("translation transport failure")]
    Transport {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("translation provider returned an error status")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body for diagnostics.
        body: String,
    },
    /// The provider response could not be decoded.
    #[error("translation response could not be decoded")]
    Decode {
        /// Underlying decode error.
        source: reqwest::Error,
    },
    /// The provider returned a different number of strings than requested.
    #[error("translation batch length mismatch")]
    LengthMismatch {
        /// Number of source strings sent.
        expected: usize,
        /// Number of translated strings received.
        actual: usize,
    },
    /// Provider-specific failure reported by a non-HTTP client.
    #[error("translation provider failure")]
    Provider {
        /// Provider-supplied detail.
        message: String,
    },
}

impl FillError {
    /// Build a [`FillError::Provider`] from any displayable detail.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Short machine-readable label used in logs and events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::Provider { .. } => "provider",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_messages_are_stable() {
        let mismatch = FillError::LengthMismatch {
            expected: 3,
            actual: 1,
        };
        assert_eq!(mismatch.kind(), "length_mismatch");
        assert_eq!(mismatch.to_string(), "translation batch length mismatch");

        let provider = FillError::provider("quota exceeded");
        assert_eq!(provider.kind(), "provider");
        assert!(matches!(provider, FillError::Provider { message } if message == "quota exceeded"));
    }
}
