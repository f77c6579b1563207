//! Engine wiring and error types shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use lexicache_config::{ConfigError, EngineConfig, load_canonical_bundle};
use lexicache_events::EventBus;
use lexicache_fill::{FillClient, HttpFillClient, HttpFillConfig};
use lexicache_runtime::Resolver;
use lexicache_store::{FileKeyValueStore, LocaleStore};
use tracing::{debug, warn};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::MissingField { field } => {
                Self::validation(format!("missing configuration field `{field}`"))
            }
            ConfigError::InvalidField {
                field,
                reason,
                value,
            } => Self::validation(match value {
                Some(value) => format!("invalid `{field}` ({reason}): {value}"),
                None => format!("invalid `{field}` ({reason})"),
            }),
            ConfigError::Io { .. }
            | ConfigError::Json { .. }
            | ConfigError::CanonicalBundle { .. } => Self::failure(err),
        }
    }
}

/// Engine handles shared by every command.
pub(crate) struct AppContext {
    pub(crate) resolver: Resolver,
}

impl AppContext {
    /// Build the engine described by `config` using the HTTP provider.
    pub(crate) async fn bootstrap(config: &EngineConfig) -> CliResult<Self> {
        let client = HttpFillClient::new(HttpFillConfig {
            endpoint: config.fill.endpoint.clone(),
            api_key: config.fill.api_key.clone(),
            source: config.canonical_locale.clone(),
            timeout: config.fill.timeout(),
        })
        .map_err(|err| CliError::failure(anyhow!("failed to build translation client: {err}")))?;
        Self::with_client(config, Arc::new(client)).await
    }

    /// Build the engine with an arbitrary fill client.
    pub(crate) async fn with_client(
        config: &EngineConfig,
        client: Arc<dyn FillClient>,
    ) -> CliResult<Self> {
        let canonical = load_canonical_bundle(config)?;
        let store = Arc::new(LocaleStore::new(
            Arc::new(FileKeyValueStore::new(&config.store_dir)),
            config.storage_key.clone(),
            config.canonical_locale.clone(),
        ));
        let events = EventBus::new();
        log_events(&events);
        let resolver = Resolver::restore(
            config.canonical_locale.clone(),
            canonical,
            store,
            client,
            events,
        )
        .await;
        Ok(Self { resolver })
    }

    /// Retry any registry write that failed during the command.
    pub(crate) async fn shutdown(&self) {
        if let Err(err) = self.resolver.flush().await {
            warn!(error = %err, "registry could not be persisted; cached fills may be lost");
        }
    }
}

/// Mirror bus events into the log until the bus is dropped.
fn log_events(events: &EventBus) {
    let mut stream = events.subscribe(None);
    tokio::spawn(async move {
        while let Some(envelope) = stream.next().await {
            debug!(
                id = envelope.id,
                kind = envelope.event.kind(),
                event = ?envelope.event,
                "locale event"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_exit_codes() {
        let missing: CliError = ConfigError::MissingField {
            field: "canonical_path",
        }
        .into();
        assert_eq!(missing.exit_code(), 2);
        assert_eq!(
            missing.display_message(),
            "missing configuration field `canonical_path`"
        );

        let io: CliError = ConfigError::Io {
            operation: "config.read",
            path: "/nope".into(),
            source: std::io::Error::other("denied"),
        }
        .into();
        assert_eq!(io.exit_code(), 3);
    }
}
