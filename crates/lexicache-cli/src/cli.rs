//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lexicache_config::EngineConfig;
use lexicache_telemetry::init_logging;

use crate::commands::locale::{handle_missing, handle_status, handle_switch};
use crate::commands::resolve::handle_resolve;
use crate::context::{AppContext, CliError, CliResult};

/// Parses CLI arguments, executes the requested command and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let config = EngineConfig::load(cli.config.as_deref())?;
    if let Err(err) = init_logging(&config.logging.as_logging_config()) {
        eprintln!("warning: {err}");
    }
    let ctx = AppContext::bootstrap(&config).await?;
    let result = dispatch(&ctx, cli.command, cli.output).await;
    ctx.shutdown().await;
    result
}

pub(crate) async fn dispatch(
    ctx: &AppContext,
    command: Command,
    format: OutputFormat,
) -> CliResult<()> {
    let rendered = match command {
        Command::Resolve(args) => handle_resolve(ctx, &args, format)?,
        Command::Switch(args) => handle_switch(ctx, &args, format).await?,
        Command::Status => handle_status(ctx, format)?,
        Command::Missing(args) => handle_missing(ctx, &args, format)?,
    };
    println!("{rendered}");
    Ok(())
}

#[derive(Parser)]
#[command(name = "lexicache", about = "Runtime translation cache with lazy provider fills")]
pub(crate) struct Cli {
    /// JSON configuration file; falls back to `LEXICACHE_CONFIG`.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the text for a key in the active (or given) locale.
    Resolve(ResolveArgs),
    /// Make a locale active, filling its missing keys first.
    Switch(LocaleArgs),
    /// List known locales with their completeness.
    Status,
    /// List canonical keys a locale is still missing.
    Missing(LocaleArgs),
}

#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Dot-path key, e.g. `nav.home`.
    pub(crate) key: String,
    /// Resolve in this locale instead of the active one; never triggers a fill.
    #[arg(long)]
    pub(crate) locale: Option<String>,
}

#[derive(Args)]
pub(crate) struct LocaleArgs {
    /// Locale tag, e.g. `hi` or `pt-BR`.
    pub(crate) locale: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub(crate) fn parse_locale_arg(tag: &str) -> CliResult<lexicache_bundle::LocaleCode> {
    lexicache_bundle::LocaleCode::parse(tag)
        .map_err(|_| CliError::validation(format!("invalid locale `{tag}`")))
}
