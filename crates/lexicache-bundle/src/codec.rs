//! Flat dot-path projections of translation trees.
//!
//! `flatten` and `unflatten` are pure and allocation-only; they hold no shared
//! state and can run from any number of tasks at once.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::{CodecError, CodecResult};
use crate::tree::{SEPARATOR, TreeNode, join_path, present};

/// Ordered mapping of dot-path keys to leaf values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatMapping {
    entries: IndexMap<String, Option<String>>,
}

impl FlatMapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys, null leaves included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` exists, regardless of its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw leaf value for `key`; the outer `None` means the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries.get(key).map(Option::as_deref)
    }

    /// Usable text for `key`, treating null and blank leaves as absent.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(present)
    }

    /// Insert or replace a leaf, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.insert(key.into(), value);
    }

    /// Remove a key while preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.entries.shift_remove(key)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }
}

impl FromIterator<(String, Option<String>)> for FlatMapping {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FlatMapping {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, value)| (key.to_string(), Some(value.to_string())))
            .collect()
    }
}

impl IntoIterator for FlatMapping {
    type Item = (String, Option<String>);
    type IntoIter = indexmap::map::IntoIter<String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Flatten a tree depth-first into dot-path keys.
///
/// Null leaves are kept as `None`; empty branches contribute nothing. A bare
/// leaf root has no path and therefore yields an empty mapping.
#[must_use]
pub fn flatten(tree: &TreeNode) -> FlatMapping {
    let mut flat = FlatMapping::new();
    if let TreeNode::Branch(children) = tree {
        for (name, child) in children {
            flatten_into(child, name, &mut flat);
        }
    }
    flat
}

fn flatten_into(node: &TreeNode, path: &str, out: &mut FlatMapping) {
    match node {
        TreeNode::Leaf(value) => out.insert(path, value.clone()),
        TreeNode::Branch(children) => {
            for (name, child) in children {
                flatten_into(child, &join_path(path, name), out);
            }
        }
    }
}

/// Rebuild a tree from dot-path keys.
///
/// # Errors
///
/// Returns [`CodecError::InvalidSegment`] for keys with empty segments and
/// [`CodecError::PathCollision`] when one key is a strict prefix of another.
pub fn unflatten(flat: &FlatMapping) -> CodecResult<TreeNode> {
    let mut root: IndexMap<String, TreeNode> = IndexMap::new();
    for (key, value) in flat.iter() {
        insert_path(&mut root, key, value.map(ToString::to_string))?;
    }
    Ok(TreeNode::Branch(root))
}

fn insert_path(
    root: &mut IndexMap<String, TreeNode>,
    key: &str,
    value: Option<String>,
) -> CodecResult<()> {
    let segments: Vec<&str> = key.split(SEPARATOR).collect();
    if let Some(segment) = segments.iter().find(|segment| segment.is_empty()) {
        return Err(CodecError::InvalidSegment {
            path: key.to_string(),
            segment: (*segment).to_string(),
        });
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(CodecError::InvalidSegment {
            path: key.to_string(),
            segment: String::new(),
        });
    };

    let mut cursor = root;
    for (depth, segment) in parents.iter().enumerate() {
        cursor = match cursor
            .entry((*segment).to_string())
            .or_insert_with(TreeNode::empty)
        {
            TreeNode::Branch(children) => children,
            TreeNode::Leaf(_) => {
                return Err(CodecError::PathCollision {
                    key: key.to_string(),
                    existing: parents[..=depth].join("."),
                });
            }
        };
    }

    match cursor.entry((*last).to_string()) {
        Entry::Occupied(mut entry) => {
            if matches!(entry.get(), TreeNode::Branch(_)) {
                return Err(CodecError::PathCollision {
                    key: key.to_string(),
                    existing: first_leaf_path(key, entry.get()),
                });
            }
            entry.insert(TreeNode::Leaf(value));
            Ok(())
        }
        Entry::Vacant(entry) => {
            entry.insert(TreeNode::Leaf(value));
            Ok(())
        }
    }
}

fn first_leaf_path(prefix: &str, node: &TreeNode) -> String {
    match node {
        TreeNode::Leaf(_) => prefix.to_string(),
        TreeNode::Branch(children) => children.iter().next().map_or_else(
            || prefix.to_string(),
            |(name, child)| first_leaf_path(&join_path(prefix, name), child),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_bundle;

    #[test]
    fn flatten_joins_ancestor_names_in_order() -> CodecResult<()> {
        let tree = parse_bundle(
            r#"{"pages": {"banners": {"title": "Sale", "cta": null}, "empty": {}}, "footer": "(c)"}"#,
        )?;
        let flat = flatten(&tree);
        let keys: Vec<&str> = flat.keys().collect();
        assert_eq!(keys, ["pages.banners.title", "pages.banners.cta", "footer"]);
        assert_eq!(flat.get("pages.banners.cta"), Some(None));
        assert_eq!(flat.text("pages.banners.title"), Some("Sale"));
        Ok(())
    }

    #[test]
    fn round_trip_restores_the_tree() -> CodecResult<()> {
        let tree = parse_bundle(
            r#"{"nav": {"home": "Home", "cart": {"title": "Cart", "empty": null}}, "ok": "OK"}"#,
        )?;
        assert_eq!(unflatten(&flatten(&tree))?, tree);
        Ok(())
    }

    #[test]
    fn unflatten_fails_fast_on_prefix_collision() {
        let flat: FlatMapping = [("a", "leaf"), ("a.b", "nested")].into_iter().collect();
        assert!(matches!(
            unflatten(&flat),
            Err(CodecError::PathCollision { key, existing }) if key == "a.b" && existing == "a"
        ));

        let flat: FlatMapping = [("a.b.c", "nested"), ("a.b", "leaf")].into_iter().collect();
        assert!(matches!(
            unflatten(&flat),
            Err(CodecError::PathCollision { key, existing }) if key == "a.b" && existing == "a.b.c"
        ));
    }

    #[test]
    fn unflatten_rejects_empty_segments() {
        for key in ["", "a..b", ".a", "a."] {
            let flat: FlatMapping = [(key, "x")].into_iter().collect();
            assert!(
                matches!(unflatten(&flat), Err(CodecError::InvalidSegment { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn flatten_of_leaf_root_is_empty() {
        assert!(flatten(&TreeNode::text("orphan")).is_empty());
        assert!(flatten(&TreeNode::empty()).is_empty());
    }

    #[test]
    fn remove_preserves_order() {
        let mut flat: FlatMapping = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(flat.remove("b"), Some(Some("2".to_string())));
        assert_eq!(flat.keys().collect::<Vec<_>>(), ["a", "c"]);
    }
}
