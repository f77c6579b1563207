use crate::cli::{OutputFormat, ResolveArgs, parse_locale_arg};
use crate::context::{AppContext, CliResult};
use crate::output::render_resolved;

pub(crate) fn handle_resolve(
    ctx: &AppContext,
    args: &ResolveArgs,
    format: OutputFormat,
) -> CliResult<String> {
    let locale = match &args.locale {
        Some(tag) => parse_locale_arg(tag)?,
        None => ctx.resolver.active_locale(),
    };
    let text = ctx.resolver.resolve_in(&locale, &args.key);
    render_resolved(&locale, &args.key, &text, format)
}
