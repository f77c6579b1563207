//! Field parsers shared by the file and environment layers.

use lexicache_bundle::LocaleCode;
use lexicache_store::is_valid_key;
use lexicache_telemetry::LogFormat;
use url::Url;

use crate::error::{ConfigError, ConfigResult};

pub(crate) fn parse_locale(field: &'static str, value: &str) -> ConfigResult<LocaleCode> {
    LocaleCode::parse(value).map_err(|_| ConfigError::invalid(field, "invalid locale tag", value))
}

pub(crate) fn parse_endpoint(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|_| ConfigError::invalid(field, "invalid url", value))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(field, "scheme must be http or https", value)),
    }
}

pub(crate) fn parse_timeout(field: &'static str, value: &str) -> ConfigResult<u64> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(field, "must be a positive integer", value))?;
    check_timeout(field, secs)
}

pub(crate) fn check_timeout(field: &'static str, secs: u64) -> ConfigResult<u64> {
    if secs == 0 {
        return Err(ConfigError::invalid(field, "must be greater than zero", "0"));
    }
    Ok(secs)
}

pub(crate) fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<LogFormat> {
    value
        .parse::<LogFormat>()
        .map_err(|_| ConfigError::invalid(field, "expected json or pretty", value))
}

pub(crate) fn non_empty(field: &'static str, value: String) -> ConfigResult<String> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            reason: "must not be empty",
            value: None,
        });
    }
    Ok(value)
}

pub(crate) fn parse_storage_key(field: &'static str, value: String) -> ConfigResult<String> {
    let value = non_empty(field, value)?;
    if !is_valid_key(&value) {
        return Err(ConfigError::invalid(
            field,
            "only letters, digits, '.', '-' and '_' allowed; no leading '.'",
            &value,
        ));
    }
    Ok(value)
}
