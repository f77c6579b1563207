//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use lexicache_bundle::LocaleCode;
use lexicache_runtime::{FillOutcome, SwitchOutcome};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

/// One row of `lexicache status`.
#[derive(Debug, Serialize)]
pub(crate) struct LocaleStatus {
    pub(crate) locale: String,
    pub(crate) state: &'static str,
    pub(crate) missing: usize,
    pub(crate) active: bool,
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn render_resolved(
    locale: &LocaleCode,
    key: &str,
    text: &str,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "locale": locale.as_str(),
            "key": key,
            "text": text,
        })),
        OutputFormat::Table => Ok(text.to_string()),
    }
}

pub(crate) fn render_switch(
    outcome: &SwitchOutcome,
    remaining: usize,
    canonical: &LocaleCode,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            let fill = match &outcome.fill {
                None => json!(null),
                Some(FillOutcome::Filled { filled, .. }) => {
                    json!({"status": "filled", "filled": filled})
                }
                Some(FillOutcome::Failed { reason }) => {
                    json!({"status": "failed", "reason": reason})
                }
            };
            to_json(&json!({
                "previous": outcome.previous.as_str(),
                "active": outcome.active.as_str(),
                "changed": outcome.changed(),
                "fill": fill,
                "remaining": remaining,
            }))
        }
        OutputFormat::Table => {
            let mut text = if outcome.changed() {
                format!("active: {} (was {})", outcome.active, outcome.previous)
            } else {
                format!("active: {} (unchanged)", outcome.active)
            };
            match &outcome.fill {
                Some(FillOutcome::Filled { filled, .. }) => {
                    let _ = write!(text, "\nfilled {filled} key(s)");
                }
                Some(FillOutcome::Failed { reason }) => {
                    let _ = write!(
                        text,
                        "\nfill failed ({reason}); missing keys fall back to {canonical}"
                    );
                }
                None => {}
            }
            if remaining > 0 {
                let _ = write!(text, "\n{remaining} key(s) still missing");
            }
            Ok(text)
        }
    }
}

pub(crate) fn render_status(rows: &[LocaleStatus], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&rows),
        OutputFormat::Table => {
            let mut text = format!("{:<2}{:<12} {:<10} {:>7}", "", "LOCALE", "STATE", "MISSING");
            for row in rows {
                let marker = if row.active { "*" } else { "" };
                let _ = write!(
                    text,
                    "\n{:<2}{:<12} {:<10} {:>7}",
                    marker, row.locale, row.state, row.missing
                );
            }
            Ok(text)
        }
    }
}

pub(crate) fn render_missing(
    locale: &LocaleCode,
    keys: &[String],
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "locale": locale.as_str(),
            "missing": keys,
        })),
        OutputFormat::Table if keys.is_empty() => Ok(format!("{locale} is complete")),
        OutputFormat::Table => Ok(keys.join("\n")),
    }
}
