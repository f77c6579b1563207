use lexicache_runtime::RuntimeError;

use crate::cli::{LocaleArgs, OutputFormat, parse_locale_arg};
use crate::context::{AppContext, CliError, CliResult};
use crate::output::{LocaleStatus, render_missing, render_status, render_switch};

pub(crate) async fn handle_switch(
    ctx: &AppContext,
    args: &LocaleArgs,
    format: OutputFormat,
) -> CliResult<String> {
    let outcome = ctx
        .resolver
        .switch_locale(&args.locale)
        .await
        .map_err(|err| match err {
            RuntimeError::InvalidLocale { value, .. } => {
                CliError::validation(format!("invalid locale `{value}`"))
            }
        })?;
    let remaining = ctx.resolver.missing_keys(&outcome.active).len();
    render_switch(&outcome, remaining, ctx.resolver.registry().canonical(), format)
}

pub(crate) fn handle_status(ctx: &AppContext, format: OutputFormat) -> CliResult<String> {
    let active = ctx.resolver.active_locale();
    let rows: Vec<LocaleStatus> = ctx
        .resolver
        .known_locales()
        .into_iter()
        .map(|locale| LocaleStatus {
            active: locale == active,
            state: ctx.resolver.state(&locale).as_str(),
            missing: ctx.resolver.missing_keys(&locale).len(),
            locale: locale.to_string(),
        })
        .collect();
    render_status(&rows, format)
}

pub(crate) fn handle_missing(
    ctx: &AppContext,
    args: &LocaleArgs,
    format: OutputFormat,
) -> CliResult<String> {
    let locale = parse_locale_arg(&args.locale)?;
    let keys = ctx.resolver.missing_keys(&locale);
    render_missing(&locale, &keys, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use lexicache_config::EngineConfig;
    use std::fs;
    use std::path::Path;

    fn write_config(dir: &Path, endpoint: &str) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        fs::write(
            dir.join("en.json"),
            r#"{"greeting": "Hello", "farewell": "Bye"}"#,
        )?;
        let config_path = dir.join("lexicache.json");
        fs::write(
            &config_path,
            format!(
                r#"{{"canonical_path": "en.json", "store_dir": "store", "fill": {{"endpoint": "{endpoint}", "timeout_secs": 2}}}}"#
            ),
        )?;
        Ok(EngineConfig::load_with(Some(&config_path), |_| None)?)
    }

    #[tokio::test]
    async fn switch_fills_once_and_persists_across_runs() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/translate");
            then.status(200).json_body(serde_json::json!({
                "data": {"translations": [
                    {"translatedText": "नमस्ते"},
                    {"translatedText": "अलविदा"}
                ]}
            }));
        });
        let dir = tempfile::tempdir()?;
        let config = write_config(dir.path(), &format!("{}/translate", server.base_url()))?;

        let ctx = AppContext::bootstrap(&config).await.map_err(|err| err.display_message())?;
        let switch = LocaleArgs {
            locale: "hi".to_string(),
        };
        let rendered = handle_switch(&ctx, &switch, OutputFormat::Json)
            .await
            .map_err(|err| err.display_message())?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;
        assert_eq!(value["active"], "hi");
        assert_eq!(value["remaining"], 0);
        mock.assert_hits(1);

        let second = AppContext::bootstrap(&config).await.map_err(|err| err.display_message())?;
        assert_eq!(second.resolver.active_locale().as_str(), "hi");
        assert_eq!(second.resolver.resolve("farewell"), "अलविदा");
        let status = handle_status(&second, OutputFormat::Table).map_err(|err| err.display_message())?;
        assert!(status.contains("hi"));
        assert!(status.contains("complete"));
        mock.assert_hits(1);
        Ok(())
    }

    #[tokio::test]
    async fn provider_outage_still_switches_with_canonical_fallback()
    -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/translate");
            then.status(503);
        });
        let dir = tempfile::tempdir()?;
        let config = write_config(dir.path(), &format!("{}/translate", server.base_url()))?;
        let ctx = AppContext::bootstrap(&config).await.map_err(|err| err.display_message())?;

        let rendered = handle_switch(
            &ctx,
            &LocaleArgs {
                locale: "de".to_string(),
            },
            OutputFormat::Table,
        )
        .await
        .map_err(|err| err.display_message())?;
        assert!(rendered.contains("fill failed (status)"));
        assert_eq!(ctx.resolver.resolve("greeting"), "Hello");

        let missing = handle_missing(
            &ctx,
            &LocaleArgs {
                locale: "de".to_string(),
            },
            OutputFormat::Table,
        )
        .map_err(|err| err.display_message())?;
        assert_eq!(missing, "greeting\nfarewell");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_switch_locale_exits_with_validation_code() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let config = write_config(dir.path(), "http://127.0.0.1:9/translate")?;
        let ctx = AppContext::bootstrap(&config).await.map_err(|err| err.display_message())?;
        let err = handle_switch(
            &ctx,
            &LocaleArgs {
                locale: "not a locale".to_string(),
            },
            OutputFormat::Table,
        )
        .await
        .err();
        assert_eq!(err.map(|err| err.exit_code()), Some(2));
        Ok(())
    }
}
