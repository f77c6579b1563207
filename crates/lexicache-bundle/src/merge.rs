//! Positional merge of fetched translations into a target bundle.

use crate::codec::{FlatMapping, flatten, unflatten};
use crate::error::CodecResult;
use crate::tree::{TreeNode, is_missing};

/// Apply fetched values to `target` by position.
///
/// `fetched[i]` fills `missing[i]`. Every other target entry is carried over
/// untouched. A short `fetched` leaves the trailing keys missing for the next
/// attempt; extra values are ignored. Blank fetched values are not stored.
#[must_use]
pub fn merge(target: &FlatMapping, missing: &[String], fetched: &[String]) -> FlatMapping {
    let mut merged = target.clone();
    for (key, value) in missing.iter().zip(fetched) {
        if is_missing(Some(value.as_str())) {
            continue;
        }
        merged.insert(key.clone(), Some(value.clone()));
    }
    merged
}

/// Merge into a nested bundle and rebuild the tree.
///
/// # Errors
///
/// Returns a [`crate::CodecError`] when the merged keys cannot be nested,
/// which happens only if `missing` collides with the shape of `target`.
pub fn merge_bundle(
    target: &TreeNode,
    missing: &[String],
    fetched: &[String],
) -> CodecResult<TreeNode> {
    let merged = merge(&flatten(target), missing, fetched);
    unflatten(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::missing_keys;
    use crate::error::CodecError;
    use crate::tree::parse_bundle;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn merge_fills_by_position_and_keeps_existing() {
        let target: FlatMapping = [("greeting", "नमस्ते")].into_iter().collect();
        let merged = merge(&target, &keys(&["farewell"]), &keys(&["अलविदा"]));
        assert_eq!(merged.text("greeting"), Some("नमस्ते"));
        assert_eq!(merged.text("farewell"), Some("अलविदा"));
    }

    #[test]
    fn merge_tolerates_short_and_long_responses() {
        let target = FlatMapping::new();
        let missing = keys(&["a", "b", "c"]);

        let short = merge(&target, &missing, &keys(&["A"]));
        assert_eq!(short.text("a"), Some("A"));
        assert!(!short.contains_key("b"));
        assert!(!short.contains_key("c"));

        let long = merge(&target, &keys(&["a"]), &keys(&["A", "extra"]));
        assert_eq!(long.len(), 1);
    }

    #[test]
    fn merge_is_monotonic_over_existing_keys() {
        let target: FlatMapping = [("a", "1"), ("b", "2")].into_iter().collect();
        let merged = merge(&target, &keys(&["c"]), &keys(&["3"]));
        for (key, value) in target.iter() {
            assert_eq!(merged.get(key), Some(value));
        }
    }

    #[test]
    fn blank_fetched_values_leave_keys_missing() {
        let canonical: FlatMapping = [("a", "A"), ("b", "B")].into_iter().collect();
        let target = FlatMapping::new();
        let missing = missing_keys(&canonical, &target);
        let merged = merge(&target, &missing, &keys(&["  ", "b"]));
        assert_eq!(missing_keys(&canonical, &merged), ["a"]);
    }

    #[test]
    fn merge_bundle_rebuilds_nested_shape() -> CodecResult<()> {
        let target = parse_bundle(r#"{"nav": {"home": "Inicio"}}"#)?;
        let merged = merge_bundle(&target, &keys(&["nav.cart", "footer"]), &keys(&["Carrito", "Pie"]))?;
        let expected = parse_bundle(r#"{"nav": {"home": "Inicio", "cart": "Carrito"}, "footer": "Pie"}"#)?;
        assert_eq!(merged, expected);
        Ok(())
    }

    #[test]
    fn merge_bundle_reports_shape_collisions() -> CodecResult<()> {
        let target = parse_bundle(r#"{"nav": "flat"}"#)?;
        let result = merge_bundle(&target, &keys(&["nav.home"]), &keys(&["Inicio"]));
        assert!(matches!(result, Err(CodecError::PathCollision { .. })));
        Ok(())
    }
}
