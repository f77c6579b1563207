//! Locale registry: the canonical bundle plus every cached locale bundle.
//!
//! # Design
//! - Bundles are immutable `Arc<TreeNode>` values; a fill swaps in a new
//!   tree so readers observe either the old or the new bundle.
//! - Locks are never held across `.await`; poisoned locks are recovered.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use lexicache_bundle::{FlatMapping, LocaleCode, TreeNode, flatten, missing_keys};
use lexicache_store::RegistrySnapshot;

/// Shared state for all locales known to the process.
#[derive(Debug)]
pub struct LocaleRegistry {
    canonical: LocaleCode,
    canonical_bundle: Arc<TreeNode>,
    canonical_flat: FlatMapping,
    bundles: RwLock<HashMap<LocaleCode, Arc<TreeNode>>>,
    active: RwLock<LocaleCode>,
}

impl LocaleRegistry {
    /// Registry holding only the canonical bundle, with canonical active.
    #[must_use]
    pub fn new(canonical: LocaleCode, canonical_bundle: TreeNode) -> Self {
        Self::from_snapshot(
            canonical.clone(),
            canonical_bundle,
            RegistrySnapshot::empty(canonical),
        )
    }

    /// Registry seeded from a restored snapshot.
    #[must_use]
    pub fn from_snapshot(
        canonical: LocaleCode,
        canonical_bundle: TreeNode,
        snapshot: RegistrySnapshot,
    ) -> Self {
        let canonical_flat = flatten(&canonical_bundle);
        let bundles = snapshot
            .bundles
            .into_iter()
            .filter(|(code, _)| *code != canonical)
            .collect();
        Self {
            canonical,
            canonical_bundle: Arc::new(canonical_bundle),
            canonical_flat,
            bundles: RwLock::new(bundles),
            active: RwLock::new(snapshot.active),
        }
    }

    /// The authored reference locale.
    #[must_use]
    pub const fn canonical(&self) -> &LocaleCode {
        &self.canonical
    }

    /// The authored reference bundle.
    #[must_use]
    pub fn canonical_bundle(&self) -> &TreeNode {
        &self.canonical_bundle
    }

    /// Flattened canonical bundle, computed once at construction.
    #[must_use]
    pub const fn canonical_flat(&self) -> &FlatMapping {
        &self.canonical_flat
    }

    /// Currently active locale.
    #[must_use]
    pub fn active(&self) -> LocaleCode {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_active(&self, locale: LocaleCode) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = locale;
    }

    /// Bundle for `locale`; the canonical locale yields the canonical bundle.
    #[must_use]
    pub fn bundle(&self, locale: &LocaleCode) -> Option<Arc<TreeNode>> {
        if *locale == self.canonical {
            return Some(Arc::clone(&self.canonical_bundle));
        }
        self.bundles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locale)
            .cloned()
    }

    /// Create an empty bundle for `locale` on first reference.
    pub(crate) fn ensure_bundle(&self, locale: &LocaleCode) {
        if *locale == self.canonical {
            return;
        }
        self.bundles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(locale.clone())
            .or_insert_with(|| Arc::new(TreeNode::empty()));
    }

    pub(crate) fn replace_bundle(&self, locale: &LocaleCode, tree: TreeNode) {
        self.bundles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(locale.clone(), Arc::new(tree));
    }

    /// Canonical keys `locale` has no usable value for, in canonical order.
    #[must_use]
    pub fn missing_keys(&self, locale: &LocaleCode) -> Vec<String> {
        if *locale == self.canonical {
            return Vec::new();
        }
        let target = self
            .bundle(locale)
            .map(|tree| flatten(&tree))
            .unwrap_or_default();
        missing_keys(&self.canonical_flat, &target)
    }

    /// Canonical locale first, then every cached locale in sorted order.
    #[must_use]
    pub fn known_locales(&self) -> Vec<LocaleCode> {
        let mut cached: Vec<LocaleCode> = self
            .bundles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        cached.sort();
        let mut locales = Vec::with_capacity(cached.len() + 1);
        locales.push(self.canonical.clone());
        locales.extend(cached);
        locales
    }

    /// Point-in-time copy for persistence.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let bundles = self
            .bundles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(code, tree)| (code.clone(), Arc::clone(tree)))
            .collect();
        RegistrySnapshot {
            active: self.active(),
            bundles,
        }
    }
}
