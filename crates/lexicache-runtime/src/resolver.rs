//! Resolver: lookups with fallback plus the switch/fill state machine.
//!
//! # Design
//! - `resolve` is synchronous and infallible: active bundle, then canonical,
//!   then the raw key.
//! - At most one fill runs per locale. Later callers join the same shared
//!   future instead of issuing a second provider call.
//! - Fills run on their own task, so a caller that gives up does not cancel
//!   a batch that is already paid for.
//! - A failed fill leaves the bundle untouched; canonical text is never
//!   copied into a locale bundle.
//! - The in-flight entry is cleared when the fill task ends, even by panic or
//!   abort, and only if it still belongs to that task.
//! - Only a switch to the most recently requested locale commits it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use lexicache_bundle::{LocaleCode, TreeNode, merge_bundle, source_texts};
use lexicache_events::{EventBus, LocaleEvent};
use lexicache_fill::{FillClient, fill_batch};
use lexicache_store::{LocaleStore, StoreResult};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::registry::LocaleRegistry;

/// Completeness of one locale relative to the canonical bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleState {
    /// Never referenced; no bundle exists yet.
    Unknown,
    /// Bundle exists but some canonical keys are still missing.
    Partial,
    /// Every canonical key has a usable value.
    Complete,
}

impl LocaleState {
    /// Lowercase label for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Partial => "partial",
            Self::Complete => "complete",
        }
    }
}

/// Result of one fill attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// The batch was merged.
    Filled {
        /// Keys that received a value.
        filled: usize,
        /// Keys still missing afterwards.
        remaining: usize,
    },
    /// Nothing was merged; the bundle is unchanged.
    Failed {
        /// Machine-readable failure kind.
        reason: String,
    },
}

/// What a call to [`Resolver::switch_locale`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// Locale active before the call.
    pub previous: LocaleCode,
    /// Locale active after the call.
    pub active: LocaleCode,
    /// Fill performed (or joined) on the way, if one was needed.
    pub fill: Option<FillOutcome>,
}

impl SwitchOutcome {
    /// Whether the active locale changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.active
    }
}

type SharedFill = Shared<BoxFuture<'static, FillOutcome>>;

struct InflightFill {
    ticket: u64,
    shared: SharedFill,
}

/// Removes the in-flight entry for `locale` if it still carries `ticket`.
struct InflightGuard {
    inner: Arc<ResolverInner>,
    locale: LocaleCode,
    ticket: u64,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let removed = {
            let mut inflight = self.inner.inflight();
            if inflight
                .get(&self.locale)
                .is_some_and(|entry| entry.ticket == self.ticket)
            {
                inflight.remove(&self.locale)
            } else {
                None
            }
        };
        // The shared future may own another guard; drop it outside the lock.
        drop(removed);
    }
}

/// Cloneable handle over the registry, store and fill client.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    registry: Arc<LocaleRegistry>,
    store: Arc<LocaleStore>,
    client: Arc<dyn FillClient>,
    events: EventBus,
    inflight: Mutex<HashMap<LocaleCode, InflightFill>>,
    fill_tickets: AtomicU64,
    requested: Mutex<Option<LocaleCode>>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl Resolver {
    /// Wire a resolver over an existing registry.
    #[must_use]
    pub fn new(
        registry: Arc<LocaleRegistry>,
        store: Arc<LocaleStore>,
        client: Arc<dyn FillClient>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                registry,
                store,
                client,
                events,
                inflight: Mutex::new(HashMap::new()),
                fill_tickets: AtomicU64::new(0),
                requested: Mutex::new(None),
                persist_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Restore persisted bundles from `store` and build a resolver over them.
    pub async fn restore(
        canonical: LocaleCode,
        canonical_bundle: TreeNode,
        store: Arc<LocaleStore>,
        client: Arc<dyn FillClient>,
        events: EventBus,
    ) -> Self {
        let snapshot = store.load(&canonical_bundle).await;
        let registry = LocaleRegistry::from_snapshot(canonical, canonical_bundle, snapshot);
        Self::new(Arc::new(registry), store, client, events)
    }

    /// Shared registry.
    #[must_use]
    pub fn registry(&self) -> &LocaleRegistry {
        &self.inner.registry
    }

    /// Event bus receiving fill and switch notifications.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Currently active locale.
    #[must_use]
    pub fn active_locale(&self) -> LocaleCode {
        self.inner.registry.active()
    }

    /// Canonical locale followed by every cached locale.
    #[must_use]
    pub fn known_locales(&self) -> Vec<LocaleCode> {
        self.inner.registry.known_locales()
    }

    /// Canonical keys `locale` is still missing.
    #[must_use]
    pub fn missing_keys(&self, locale: &LocaleCode) -> Vec<String> {
        self.inner.registry.missing_keys(locale)
    }

    /// Completeness of `locale`.
    #[must_use]
    pub fn state(&self, locale: &LocaleCode) -> LocaleState {
        let registry = &self.inner.registry;
        if locale == registry.canonical() {
            return LocaleState::Complete;
        }
        if registry.bundle(locale).is_none() {
            return LocaleState::Unknown;
        }
        if registry.missing_keys(locale).is_empty() {
            LocaleState::Complete
        } else {
            LocaleState::Partial
        }
    }

    /// Whether a fill for `locale` is in flight.
    #[must_use]
    pub fn is_filling(&self, locale: &LocaleCode) -> bool {
        self.inner.inflight().contains_key(locale)
    }

    /// Text for `key` in the active locale.
    #[must_use]
    pub fn resolve(&self, key: &str) -> String {
        self.resolve_in(&self.active_locale(), key)
    }

    /// Text for `key` in `locale`, falling back to canonical, then to `key`.
    #[must_use]
    pub fn resolve_in(&self, locale: &LocaleCode, key: &str) -> String {
        let registry = &self.inner.registry;
        if locale != registry.canonical()
            && let Some(text) = registry
                .bundle(locale)
                .and_then(|tree| tree.lookup(key).map(ToString::to_string))
        {
            return text;
        }
        registry
            .canonical_bundle()
            .lookup(key)
            .map_or_else(|| key.to_string(), ToString::to_string)
    }

    /// Make `tag` the active locale, filling its missing keys first.
    ///
    /// The locale becomes active once the fill settles, whether or not it
    /// succeeded; missing keys then resolve through the canonical bundle.
    /// A switch overtaken by a call for another locale while its fill was
    /// running does not commit; its outcome reports the active locale instead.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidLocale`] when `tag` is not a valid
    /// locale. Fill and persistence failures are logged and published on
    /// the event bus instead.
    pub async fn switch_locale(&self, tag: &str) -> RuntimeResult<SwitchOutcome> {
        let target = LocaleCode::parse(tag).map_err(|source| RuntimeError::InvalidLocale {
            value: tag.to_string(),
            source,
        })?;
        *self.inner.requested() = Some(target.clone());
        let registry = &self.inner.registry;
        let previous = registry.active();
        if target == previous {
            debug!(locale = %target, "locale already active");
            return Ok(SwitchOutcome {
                previous,
                active: target,
                fill: None,
            });
        }

        let fill = if &target == registry.canonical() {
            None
        } else {
            registry.ensure_bundle(&target);
            if registry.missing_keys(&target).is_empty() {
                None
            } else {
                Some(self.fill(&target).await)
            }
        };

        if self.inner.requested().as_ref() != Some(&target) {
            debug!(locale = %target, "switch superseded by a later call");
            return Ok(SwitchOutcome {
                previous,
                active: registry.active(),
                fill,
            });
        }

        registry.set_active(target.clone());
        info!(from = %previous, to = %target, "switched locale");
        self.inner.events.publish(LocaleEvent::LocaleSwitched {
            from: previous.to_string(),
            to: target.to_string(),
        });
        self.inner.persist("switch_locale").await;

        Ok(SwitchOutcome {
            previous,
            active: target,
            fill,
        })
    }

    /// Fill the missing keys of `locale`, joining an in-flight fill if any.
    pub async fn fill(&self, locale: &LocaleCode) -> FillOutcome {
        let (shared, started) = {
            let mut inflight = self.inner.inflight();
            if let Some(existing) = inflight.get(locale) {
                debug!(locale = %locale, "joining in-flight fill");
                (existing.shared.clone(), None)
            } else {
                let ticket = self.inner.fill_tickets.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = oneshot::channel();
                let cleanup = InflightGuard {
                    inner: Arc::clone(&self.inner),
                    locale: locale.clone(),
                    ticket,
                };
                let shared = async move {
                    rx.await.unwrap_or_else(|_| {
                        error!(locale = %cleanup.locale, "fill task ended without an outcome");
                        drop(cleanup);
                        FillOutcome::Failed {
                            reason: "aborted".to_string(),
                        }
                    })
                }
                .boxed()
                .shared();
                inflight.insert(
                    locale.clone(),
                    InflightFill {
                        ticket,
                        shared: shared.clone(),
                    },
                );
                (shared, Some((ticket, tx)))
            }
        };

        if let Some((ticket, tx)) = started {
            let guard = InflightGuard {
                inner: Arc::clone(&self.inner),
                locale: locale.clone(),
                ticket,
            };
            tokio::spawn(async move {
                let guard = guard;
                let outcome = guard.inner.run_fill(&guard.locale).await;
                drop(guard);
                let _ = tx.send(outcome);
            });
        }
        shared.await
    }

    /// Retry any registry write that failed earlier.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the retry fails again.
    pub async fn flush(&self) -> StoreResult<bool> {
        let _guard = self.inner.persist_lock.lock().await;
        self.inner.store.flush().await
    }
}

impl ResolverInner {
    fn inflight(&self) -> MutexGuard<'_, HashMap<LocaleCode, InflightFill>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn requested(&self) -> MutexGuard<'_, Option<LocaleCode>> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_fill(&self, locale: &LocaleCode) -> FillOutcome {
        let missing = self.registry.missing_keys(locale);
        if missing.is_empty() {
            return FillOutcome::Filled {
                filled: 0,
                remaining: 0,
            };
        }
        let texts = source_texts(self.registry.canonical_flat(), &missing);

        info!(locale = %locale, missing = missing.len(), "filling missing translations");
        self.events.publish(LocaleEvent::FillStarted {
            locale: locale.to_string(),
            missing: missing.len(),
        });

        let fetched = match fill_batch(self.client.as_ref(), &texts, locale).await {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(locale = %locale, kind = err.kind(), error = %err, "translation fill failed; bundle unchanged");
                return self.fill_failed(locale, err.kind());
            }
        };

        let current = self.registry.bundle(locale).unwrap_or_default();
        match merge_bundle(&current, &missing, &fetched) {
            Ok(merged) => self.registry.replace_bundle(locale, merged),
            Err(err) => {
                error!(locale = %locale, error = %err, "fetched translations could not be merged");
                return self.fill_failed(locale, "codec");
            }
        }

        let remaining = self.registry.missing_keys(locale).len();
        let filled = missing.len().saturating_sub(remaining);
        info!(locale = %locale, filled, remaining, "fill merged");
        self.events.publish(LocaleEvent::FillCompleted {
            locale: locale.to_string(),
            filled,
            remaining,
        });
        self.persist("fill").await;
        FillOutcome::Filled { filled, remaining }
    }

    fn fill_failed(&self, locale: &LocaleCode, reason: &str) -> FillOutcome {
        self.events.publish(LocaleEvent::FillFailed {
            locale: locale.to_string(),
            reason: reason.to_string(),
        });
        FillOutcome::Failed {
            reason: reason.to_string(),
        }
    }

    async fn persist(&self, operation: &'static str) {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.registry.snapshot();
        if let Err(err) = self.store.save(&snapshot).await {
            error!(operation, error = %err, "failed to persist registry; continuing in memory");
            self.events.publish(LocaleEvent::PersistFailed {
                operation: operation.to_string(),
            });
        }
    }
}
