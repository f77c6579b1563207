//! Persisted registry envelope.
//!
//! On disk the registry is one JSON document:
//! `{"activeLocale": "<code>", "bundles": {"<code>": <tree>, ...}}`.
//! Bundles are decoded individually so one bad bundle does not take the
//! others down with it.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use lexicache_bundle::{LocaleCode, TreeNode, parse_bundle};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{StoreError, StoreResult};

/// Point-in-time copy of the registry state worth persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySnapshot {
    /// Locale that was active when the snapshot was taken.
    pub active: LocaleCode,
    /// Non-canonical bundles keyed by locale.
    pub bundles: BTreeMap<LocaleCode, Arc<TreeNode>>,
}

impl RegistrySnapshot {
    /// Snapshot with no bundles and `active` selected.
    #[must_use]
    pub const fn empty(active: LocaleCode) -> Self {
        Self {
            active,
            bundles: BTreeMap::new(),
        }
    }

    /// Bundle stored for `locale`, if any.
    #[must_use]
    pub fn bundle(&self, locale: &LocaleCode) -> Option<&TreeNode> {
        self.bundles.get(locale).map(AsRef::as_ref)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    active_locale: &'a str,
    bundles: BTreeMap<&'a str, &'a TreeNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEnvelope {
    pub(crate) active_locale: Option<String>,
    #[serde(default)]
    pub(crate) bundles: IndexMap<String, Box<RawValue>>,
}

/// Encode a snapshot, leaving out the canonical bundle.
pub(crate) fn encode(snapshot: &RegistrySnapshot, canonical: &LocaleCode) -> StoreResult<Vec<u8>> {
    let envelope = EnvelopeRef {
        active_locale: snapshot.active.as_str(),
        bundles: snapshot
            .bundles
            .iter()
            .filter(|(code, _)| *code != canonical)
            .map(|(code, tree)| (code.as_str(), tree.as_ref()))
            .collect(),
    };
    serde_json::to_vec(&envelope).map_err(|source| StoreError::Serialize {
        operation: "snapshot.encode",
        source,
    })
}

pub(crate) fn decode_envelope(bytes: &[u8]) -> StoreResult<RawEnvelope> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Serialize {
        operation: "snapshot.decode",
        source,
    })
}

pub(crate) fn decode_bundle(locale: &str, raw: &RawValue) -> StoreResult<TreeNode> {
    parse_bundle(raw.get()).map_err(|source| StoreError::Codec {
        locale: locale.to_string(),
        source,
    })
}
