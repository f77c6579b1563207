//! Nested translation trees.
//!
//! # Design
//! - `TreeNode` is a closed two-case union so every walk is exhaustive.
//! - Authored JSON is validated while it is parsed: duplicate siblings, dotted
//!   or empty names and non-string leaves are rejected with the offending path.
//! - Sibling order is the authored order and is preserved end to end.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CodecError, CodecResult};

/// Path separator used by flat keys.
pub const SEPARATOR: char = '.';

/// One node of a translation bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeNode {
    /// Text leaf; `None` models an explicit `null` in the source.
    Leaf(Option<String>),
    /// Named children in authored order.
    Branch(IndexMap<String, TreeNode>),
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl TreeNode {
    /// An empty bundle root.
    #[must_use]
    pub fn empty() -> Self {
        Self::Branch(IndexMap::new())
    }

    /// Convenience constructor for a text leaf.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Leaf(Some(value.into()))
    }

    /// Whether the node is a branch with no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Branch(children) if children.is_empty())
    }

    /// Child nodes when this node is a branch.
    #[must_use]
    pub const fn children(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Branch(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    /// Resolve a dotted key to a usable string.
    ///
    /// Absent paths, branches, null leaves and blank strings all yield `None`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut node = self;
        for segment in key.split(SEPARATOR) {
            node = node.children()?.get(segment)?;
        }
        match node {
            Self::Leaf(value) => present(value.as_deref()),
            Self::Branch(_) => None,
        }
    }

    /// Number of leaves (null leaves included).
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(children) => children.values().map(Self::leaf_count).sum(),
        }
    }
}

/// Whether a leaf value counts as missing: absent, null, empty or whitespace.
#[must_use]
pub fn is_missing(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

/// Filter a leaf value down to a usable string.
#[must_use]
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Parse an authored bundle document.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON, [`CodecError::RootNotBranch`]
/// when the document is not an object, and the structural variants of
/// [`CodecError`] for duplicate, dotted or non-string entries.
pub fn parse_bundle(raw: &str) -> CodecResult<TreeNode> {
    let node = serde_json::from_str::<RawNode>(raw).map_err(|source| CodecError::Json {
        operation: "parse_bundle",
        source,
    })?;
    if !matches!(node, RawNode::Object(_)) {
        return Err(CodecError::RootNotBranch);
    }
    node.into_tree("")
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{segment}")
    }
}

pub(crate) fn valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(SEPARATOR)
}

/// Lossless parse target that keeps duplicates and foreign leaf kinds so
/// validation can report paths instead of bare serde messages.
enum RawNode {
    Text(String),
    Null,
    Other(&'static str),
    Object(Vec<(String, RawNode)>),
}

impl RawNode {
    fn into_tree(self, path: &str) -> CodecResult<TreeNode> {
        match self {
            Self::Text(text) => Ok(TreeNode::Leaf(Some(text))),
            Self::Null => Ok(TreeNode::Leaf(None)),
            Self::Other(kind) => Err(CodecError::NonStringLeaf {
                path: path.to_string(),
                kind,
            }),
            Self::Object(entries) => {
                let mut children = IndexMap::with_capacity(entries.len());
                for (name, raw) in entries {
                    let child_path = join_path(path, &name);
                    if !valid_segment(&name) {
                        return Err(CodecError::InvalidSegment {
                            path: child_path,
                            segment: name,
                        });
                    }
                    if children.contains_key(&name) {
                        return Err(CodecError::DuplicateKey { path: child_path });
                    }
                    let node = raw.into_tree(&child_path)?;
                    children.insert(name, node);
                }
                Ok(TreeNode::Branch(children))
            }
        }
    }
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a translation tree")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RawNode, E> {
        Ok(RawNode::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<RawNode, E> {
        Ok(RawNode::Text(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Null)
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<RawNode, E> {
        Ok(RawNode::Other("boolean"))
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<RawNode, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<RawNode, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<RawNode, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawNode, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawNode::Other("array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawNode, A::Error> {
        let mut entries = Vec::new();
        while let Some((name, node)) = map.next_entry::<String, RawNode>()? {
            entries.push((name, node));
        }
        Ok(RawNode::Object(entries))
    }
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        raw.into_tree("").map_err(|err| de::Error::custom(describe(&err)))
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(Some(text)) => serializer.serialize_str(text),
            Self::Leaf(None) => serializer.serialize_unit(),
            Self::Branch(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (name, child) in children {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}

fn describe(err: &CodecError) -> String {
    match err {
        CodecError::DuplicateKey { path } => format!("{err} at `{path}`"),
        CodecError::InvalidSegment { path, .. } | CodecError::NonStringLeaf { path, .. } => {
            format!("{err} at `{path}`")
        }
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_authored_order_and_nulls() -> CodecResult<()> {
        let tree = parse_bundle(r#"{"z": "last", "a": {"y": null, "b": "B"}}"#)?;
        let Some(children) = tree.children() else {
            panic!("root should be a branch");
        };
        let names: Vec<&str> = children.keys().map(String::as_str).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(tree.lookup("a.b"), Some("B"));
        assert_eq!(tree.lookup("a.y"), None);
        assert_eq!(tree.leaf_count(), 3);
        Ok(())
    }

    #[test]
    fn parse_rejects_duplicate_siblings_with_path() {
        let err = parse_bundle(r#"{"nav": {"home": "Home", "home": "Start"}}"#);
        assert!(matches!(err, Err(CodecError::DuplicateKey { path }) if path == "nav.home"));
    }

    #[test]
    fn parse_rejects_dotted_and_empty_names() {
        assert!(matches!(
            parse_bundle(r#"{"a.b": "x"}"#),
            Err(CodecError::InvalidSegment { segment, .. }) if segment == "a.b"
        ));
        assert!(matches!(
            parse_bundle(r#"{"a": {"": "x"}}"#),
            Err(CodecError::InvalidSegment { path, .. }) if path == "a."
        ));
    }

    #[test]
    fn parse_rejects_non_string_leaves_and_non_object_roots() {
        assert!(matches!(
            parse_bundle(r#"{"count": 3}"#),
            Err(CodecError::NonStringLeaf { kind: "number", .. })
        ));
        assert!(matches!(
            parse_bundle(r#"{"items": ["a"]}"#),
            Err(CodecError::NonStringLeaf { kind: "array", .. })
        ));
        assert!(matches!(
            parse_bundle(r#""hello""#),
            Err(CodecError::RootNotBranch)
        ));
        assert!(matches!(parse_bundle("{"), Err(CodecError::Json { .. })));
    }

    #[test]
    fn lookup_treats_blank_and_branch_as_absent() -> CodecResult<()> {
        let tree = parse_bundle(r#"{"a": {"blank": "  ", "b": "Hello"}}"#)?;
        assert_eq!(tree.lookup("a.blank"), None);
        assert_eq!(tree.lookup("a"), None);
        assert_eq!(tree.lookup("a.b.c"), None);
        assert_eq!(tree.lookup("a.b"), Some("Hello"));
        Ok(())
    }

    #[test]
    fn serialise_keeps_nulls_and_order() -> anyhow::Result<()> {
        let tree = parse_bundle(r#"{"b": null, "a": "x"}"#)?;
        let rendered = serde_json::to_string(&tree)?;
        assert_eq!(parse_bundle(&rendered)?, tree);
        assert!(rendered.find("\"b\"") < rendered.find("\"a\""));
        Ok(())
    }

    #[test]
    fn serde_deserialize_reports_structural_errors() {
        let err = serde_json::from_str::<TreeNode>(r#"{"a": true}"#)
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default();
        assert!(err.contains("non-string leaf at `a`"), "{err}");
    }
}
