//! Typed configuration models.
//!
//! # Design
//! - `EngineConfig` only exists in validated form; raw layers live in
//!   `loader.rs`.

use std::path::PathBuf;
use std::time::Duration;

use lexicache_bundle::LocaleCode;
use lexicache_telemetry::{LogFormat, LoggingConfig};
use url::Url;

/// Fully resolved engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Locale the canonical bundle is authored in.
    pub canonical_locale: LocaleCode,
    /// JSON file holding the canonical bundle.
    pub canonical_path: PathBuf,
    /// Directory for persisted registry files.
    pub store_dir: PathBuf,
    /// Key the registry snapshot is stored under.
    pub storage_key: String,
    /// Translation provider settings.
    pub fill: FillConfig,
    /// Logging settings.
    pub logging: LogSettings,
}

/// Translation provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillConfig {
    /// Endpoint receiving batch requests.
    pub endpoint: Url,
    /// Optional provider API key.
    pub api_key: Option<String>,
    /// Whole-request timeout in seconds; never zero.
    pub timeout_secs: u64,
}

impl FillConfig {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level or filter directive.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Borrow as a telemetry [`LoggingConfig`].
    #[must_use]
    pub fn as_logging_config(&self) -> LoggingConfig<'_> {
        LoggingConfig {
            level: &self.level,
            format: self.format,
        }
    }
}
