//! Layered configuration loading: defaults, then an optional JSON file, then
//! `LEXICACHE_*` environment variables.
//!
//! # Design
//! - Relative paths in the config file resolve against the file's directory.
//! - The environment is read through a lookup function so tests never touch
//!   process state.

use std::fs;
use std::path::{Path, PathBuf};

use lexicache_bundle::{TreeNode, parse_bundle};
use serde::Deserialize;
use tracing::debug;

use crate::defaults::{
    DEFAULT_CANONICAL_LOCALE, DEFAULT_FILL_ENDPOINT, DEFAULT_FILL_TIMEOUT_SECS,
    DEFAULT_STORAGE_KEY, DEFAULT_STORE_DIR,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{EngineConfig, FillConfig, LogSettings};
use crate::validate::{
    check_timeout, non_empty, parse_endpoint, parse_locale, parse_log_format, parse_storage_key,
    parse_timeout,
};

/// Environment variable naming the config file when `--config` is absent.
pub const ENV_CONFIG: &str = "LEXICACHE_CONFIG";
const ENV_CANONICAL_LOCALE: &str = "LEXICACHE_CANONICAL_LOCALE";
const ENV_CANONICAL_PATH: &str = "LEXICACHE_CANONICAL_PATH";
const ENV_STORE_DIR: &str = "LEXICACHE_STORE_DIR";
const ENV_STORAGE_KEY: &str = "LEXICACHE_STORAGE_KEY";
const ENV_FILL_ENDPOINT: &str = "LEXICACHE_FILL_ENDPOINT";
const ENV_FILL_API_KEY: &str = "LEXICACHE_FILL_API_KEY";
const ENV_FILL_TIMEOUT_SECS: &str = "LEXICACHE_FILL_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "LEXICACHE_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "LEXICACHE_LOG_FORMAT";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayer {
    canonical_locale: Option<String>,
    canonical_path: Option<PathBuf>,
    store_dir: Option<PathBuf>,
    storage_key: Option<String>,
    #[serde(default)]
    fill: FileFill,
    #[serde(default)]
    logging: FileLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileFill {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLogging {
    level: Option<String>,
    format: Option<String>,
}

impl EngineConfig {
    /// Load from `config_path` (or `LEXICACHE_CONFIG`) and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed, a
    /// required field is missing, or a value fails validation.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::load`].
    pub fn load_with<F>(config_path: Option<&Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from));
        let file = match &path {
            Some(path) => read_file_layer(path)?,
            None => FileLayer::default(),
        };
        let base_dir = path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let canonical_locale = match env(ENV_CANONICAL_LOCALE) {
            Some(value) => parse_locale("canonical_locale", &value)?,
            None => parse_locale(
                "canonical_locale",
                file.canonical_locale
                    .as_deref()
                    .unwrap_or(DEFAULT_CANONICAL_LOCALE),
            )?,
        };

        let canonical_path = env(ENV_CANONICAL_PATH)
            .map(PathBuf::from)
            .or_else(|| file.canonical_path.map(|path| base_dir.join(path)))
            .ok_or(ConfigError::MissingField {
                field: "canonical_path",
            })?;

        let store_dir = env(ENV_STORE_DIR)
            .map(PathBuf::from)
            .or_else(|| file.store_dir.map(|path| base_dir.join(path)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));

        let storage_key = parse_storage_key(
            "storage_key",
            env(ENV_STORAGE_KEY)
                .or(file.storage_key)
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
        )?;

        let endpoint = parse_endpoint(
            "fill.endpoint",
            &env(ENV_FILL_ENDPOINT)
                .or(file.fill.endpoint)
                .unwrap_or_else(|| DEFAULT_FILL_ENDPOINT.to_string()),
        )?;
        let api_key = env(ENV_FILL_API_KEY).or(file.fill.api_key);
        let timeout_secs = match env(ENV_FILL_TIMEOUT_SECS) {
            Some(value) => parse_timeout("fill.timeout_secs", &value)?,
            None => check_timeout(
                "fill.timeout_secs",
                file.fill.timeout_secs.unwrap_or(DEFAULT_FILL_TIMEOUT_SECS),
            )?,
        };

        let level = non_empty(
            "logging.level",
            env(ENV_LOG_LEVEL)
                .or(file.logging.level)
                .unwrap_or_else(|| lexicache_telemetry::DEFAULT_LOG_LEVEL.to_string()),
        )?;
        let format = match env(ENV_LOG_FORMAT).or(file.logging.format) {
            Some(value) => parse_log_format("logging.format", &value)?,
            None => lexicache_telemetry::LogFormat::infer(),
        };

        debug!(
            config_file = ?path,
            canonical = %canonical_locale,
            store_dir = %store_dir.display(),
            "resolved engine configuration"
        );

        Ok(Self {
            canonical_locale,
            canonical_path,
            store_dir,
            storage_key,
            fill: FillConfig {
                endpoint,
                api_key,
                timeout_secs,
            },
            logging: LogSettings { level, format },
        })
    }
}

fn read_file_layer(path: &Path) -> ConfigResult<FileLayer> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate the canonical bundle named by `config`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::CanonicalBundle`] when it fails tree validation.
pub fn load_canonical_bundle(config: &EngineConfig) -> ConfigResult<TreeNode> {
    let path = &config.canonical_path;
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "canonical.read",
        path: path.clone(),
        source,
    })?;
    parse_bundle(&raw).map_err(|source| ConfigError::CanonicalBundle {
        path: path.clone(),
        source,
    })
}
