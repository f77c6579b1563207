//! Registry persistence over a [`KeyValueStore`].
//!
//! # Design
//! - `load` never fails: a missing, unreadable or corrupt registry degrades
//!   to an empty one and the problem is logged.
//! - Stale keys (no longer in the canonical bundle) are pruned on load only.
//! - A failed `save` is parked as pending and retried by the next `save` or
//!   by `flush`.

use std::sync::Arc;

use lexicache_bundle::{FlatMapping, LocaleCode, TreeNode, flatten, prune_stale, unflatten};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::StoreResult;
use crate::kv::KeyValueStore;
use crate::snapshot::{RegistrySnapshot, decode_bundle, decode_envelope, encode};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "lexicache.registry";

/// Persists and restores [`RegistrySnapshot`]s under one storage key.
pub struct LocaleStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    canonical: LocaleCode,
    pending: Mutex<Option<Vec<u8>>>,
}

impl LocaleStore {
    /// Bind a store to `backend`, writing under `key`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>, canonical: LocaleCode) -> Self {
        Self {
            backend,
            key: key.into(),
            canonical,
            pending: Mutex::new(None),
        }
    }

    /// Restore the registry, validated against `canonical_bundle`.
    pub async fn load(&self, canonical_bundle: &TreeNode) -> RegistrySnapshot {
        let fallback = RegistrySnapshot::empty(self.canonical.clone());
        let bytes = match self.backend.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!(key = %self.key, "no persisted registry; starting empty");
                return fallback;
            }
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to read persisted registry");
                return fallback;
            }
        };

        let envelope = match decode_envelope(&bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(key = %self.key, error = %err, "persisted registry is corrupt; starting empty");
                return fallback;
            }
        };

        let canonical_flat = flatten(canonical_bundle);
        let mut snapshot = fallback;
        for (tag, raw) in &envelope.bundles {
            let locale = match LocaleCode::parse(tag) {
                Ok(locale) => locale,
                Err(err) => {
                    warn!(locale = %tag, error = %err, "skipping bundle with invalid locale tag");
                    continue;
                }
            };
            if locale == self.canonical {
                continue;
            }
            let tree = match decode_bundle(tag, raw) {
                Ok(tree) => prune(&locale, &tree, &canonical_flat),
                Err(err) => {
                    error!(locale = %locale, error = %err, "persisted bundle is invalid; resetting it");
                    TreeNode::empty()
                }
            };
            snapshot.bundles.insert(locale, Arc::new(tree));
        }

        if let Some(active) = envelope.active_locale.as_deref() {
            match LocaleCode::parse(active) {
                Ok(locale) if locale == self.canonical || snapshot.bundles.contains_key(&locale) => {
                    snapshot.active = locale;
                }
                Ok(locale) => {
                    warn!(locale = %locale, "persisted active locale has no bundle; using canonical");
                }
                Err(err) => {
                    warn!(locale = %active, error = %err, "persisted active locale is invalid; using canonical");
                }
            }
        }

        debug!(
            key = %self.key,
            active = %snapshot.active,
            bundles = snapshot.bundles.len(),
            "restored registry"
        );
        snapshot
    }

    /// Persist `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns the serialisation or backend error. The encoded snapshot is
    /// kept as pending so a later [`Self::flush`] can retry the write.
    pub async fn save(&self, snapshot: &RegistrySnapshot) -> StoreResult<()> {
        let bytes = encode(snapshot, &self.canonical)?;
        let mut pending = self.pending.lock().await;
        match self.backend.set(&self.key, &bytes).await {
            Ok(()) => {
                *pending = None;
                Ok(())
            }
            Err(err) => {
                *pending = Some(bytes);
                Err(err)
            }
        }
    }

    /// Retry a pending write. Returns `true` when something was written.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the snapshot stays pending.
    pub async fn flush(&self) -> StoreResult<bool> {
        let mut pending = self.pending.lock().await;
        let Some(bytes) = pending.as_ref() else {
            return Ok(false);
        };
        self.backend.set(&self.key, bytes).await?;
        *pending = None;
        Ok(true)
    }

    /// Whether a failed write is waiting to be retried.
    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}

fn prune(locale: &LocaleCode, tree: &TreeNode, canonical: &FlatMapping) -> TreeNode {
    let (pruned, stale) = prune_stale(canonical, &flatten(tree));
    if stale.is_empty() {
        return tree.clone();
    }
    warn!(locale = %locale, stale = stale.len(), "pruned keys no longer in the canonical bundle");
    unflatten(&pruned).unwrap_or_else(|err| {
        error!(locale = %locale, error = %err, "pruned bundle could not be rebuilt; resetting it");
        TreeNode::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use anyhow::Result;
    use lexicache_bundle::parse_bundle;

    fn store_with(bytes: &[u8]) -> Result<LocaleStore> {
        let backend = MemoryKeyValueStore::with_entry(DEFAULT_STORAGE_KEY, bytes.to_vec());
        Ok(LocaleStore::new(
            Arc::new(backend),
            DEFAULT_STORAGE_KEY,
            LocaleCode::parse("en")?,
        ))
    }

    #[tokio::test]
    async fn corrupt_envelope_loads_empty() -> Result<()> {
        let store = store_with(b"not json")?;
        let canonical = parse_bundle(r#"{"greeting": "Hello"}"#)?;
        let snapshot = store.load(&canonical).await;
        assert_eq!(snapshot.active.as_str(), "en");
        assert!(snapshot.bundles.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_bundle_resets_only_that_locale() -> Result<()> {
        let store = store_with(
            br#"{"activeLocale": "hi", "bundles": {"hi": {"greeting": ["x"]}, "fr": {"greeting": "Bonjour"}}}"#,
        )?;
        let canonical = parse_bundle(r#"{"greeting": "Hello"}"#)?;
        let snapshot = store.load(&canonical).await;

        let hi = LocaleCode::parse("hi")?;
        let fr = LocaleCode::parse("fr")?;
        assert_eq!(snapshot.active, hi);
        assert_eq!(snapshot.bundle(&hi), Some(&TreeNode::empty()));
        assert_eq!(
            snapshot.bundle(&fr).and_then(|tree| tree.lookup("greeting")),
            Some("Bonjour")
        );
        Ok(())
    }

    #[tokio::test]
    async fn stale_keys_are_pruned_on_load() -> Result<()> {
        let store = store_with(
            br#"{"activeLocale": "de", "bundles": {"de": {"nav": {"home": "Start", "old": "Alt"}}}}"#,
        )?;
        let canonical = parse_bundle(r#"{"nav": {"home": "Home"}}"#)?;
        let snapshot = store.load(&canonical).await;
        let de = snapshot.bundle(&LocaleCode::parse("de")?).cloned();
        assert_eq!(de, Some(parse_bundle(r#"{"nav": {"home": "Start"}}"#)?));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_active_locale_falls_back_to_canonical() -> Result<()> {
        let store = store_with(br#"{"activeLocale": "ja", "bundles": {}}"#)?;
        let snapshot = store.load(&TreeNode::empty()).await;
        assert_eq!(snapshot.active.as_str(), "en");

        let store = store_with(br#"{"activeLocale": "not a tag!", "bundles": {}}"#)?;
        let snapshot = store.load(&TreeNode::empty()).await;
        assert_eq!(snapshot.active.as_str(), "en");
        Ok(())
    }

    #[tokio::test]
    async fn flush_without_pending_is_a_noop() -> Result<()> {
        let store = store_with(b"{}")?;
        assert!(!store.flush().await?);
        assert!(!store.has_pending().await);
        Ok(())
    }
}
