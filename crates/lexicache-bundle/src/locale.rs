//! Normalised locale identifiers.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CodecError, CodecResult};

/// A validated, lowercased locale tag such as `en`, `hi`, or `pt-br`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleCode(String);

impl LocaleCode {
    /// Normalise an arbitrary language tag.
    ///
    /// Surrounding whitespace is trimmed, the tag is lowercased and `_` is
    /// rewritten to `-` so `pt_BR` and `pt-br` name the same bundle.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidLocale`] when the tag is empty or contains
    /// characters outside ASCII alphanumerics, `-` and `_`.
    pub fn parse(tag: &str) -> CodecResult<Self> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(CodecError::InvalidLocale {
                value: tag.to_string(),
                reason: "empty",
            });
        }
        if !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(CodecError::InvalidLocale {
                value: tag.to_string(),
                reason: "invalid_character",
            });
        }
        let normalised = trimmed.to_ascii_lowercase().replace('_', "-");
        if normalised.starts_with('-') || normalised.ends_with('-') || normalised.contains("--") {
            return Err(CodecError::InvalidLocale {
                value: tag.to_string(),
                reason: "empty_subtag",
            });
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LocaleCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for LocaleCode {
    type Err = CodecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl AsRef<str> for LocaleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for LocaleCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LocaleCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
