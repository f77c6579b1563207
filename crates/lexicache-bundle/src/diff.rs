//! Missing-key computation between the canonical bundle and a target bundle.

use crate::codec::FlatMapping;
use crate::tree::is_missing;

/// Canonical keys the target still lacks, in canonical order.
///
/// A key is missing when the target has no entry, a null entry, or a blank
/// string. Canonical entries that are themselves blank are skipped because
/// there is no source text to send for them; this keeps every bundle complete
/// against itself.
///
/// The returned order is load-bearing: fill responses are correlated to keys
/// by position.
#[must_use]
pub fn missing_keys(canonical: &FlatMapping, target: &FlatMapping) -> Vec<String> {
    canonical
        .iter()
        .filter(|(_, source)| !is_missing(*source))
        .filter(|(key, _)| is_missing(target.get(key).flatten()))
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Whether the target has a usable value for every canonical key.
#[must_use]
pub fn is_complete(canonical: &FlatMapping, target: &FlatMapping) -> bool {
    canonical
        .iter()
        .filter(|(_, source)| !is_missing(*source))
        .all(|(key, _)| !is_missing(target.get(key).flatten()))
}

/// Canonical source strings for `keys`, in the same order.
///
/// Keys without usable canonical text are skipped, so callers should pass the
/// output of [`missing_keys`], which never contains such keys.
#[must_use]
pub fn source_texts(canonical: &FlatMapping, keys: &[String]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| canonical.text(key))
        .map(ToString::to_string)
        .collect()
}

/// Target keys that no longer exist in the canonical bundle.
#[must_use]
pub fn stale_keys(canonical: &FlatMapping, target: &FlatMapping) -> Vec<String> {
    target
        .keys()
        .filter(|key| !canonical.contains_key(key))
        .map(ToString::to_string)
        .collect()
}

/// Drop stale target keys, returning the pruned mapping and what was removed.
#[must_use]
pub fn prune_stale(canonical: &FlatMapping, target: &FlatMapping) -> (FlatMapping, Vec<String>) {
    let stale = stale_keys(canonical, target);
    if stale.is_empty() {
        return (target.clone(), stale);
    }
    let pruned = target
        .iter()
        .filter(|(key, _)| canonical.contains_key(key))
        .map(|(key, value)| (key.to_string(), value.map(ToString::to_string)))
        .collect();
    (pruned, stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::flatten;
    use crate::tree::parse_bundle;

    fn flat(raw: &str) -> FlatMapping {
        match parse_bundle(raw) {
            Ok(tree) => flatten(&tree),
            Err(err) => panic!("fixture should parse: {err}"),
        }
    }

    #[test]
    fn missing_keys_follow_canonical_order() {
        let canonical = flat(r#"{"c": "C", "a": {"x": "X", "y": "Y"}, "b": "B"}"#);
        let target = flat(r#"{"b": "b", "a": {"x": "x"}}"#);
        assert_eq!(missing_keys(&canonical, &target), ["c", "a.y"]);
        assert!(!is_complete(&canonical, &target));
    }

    #[test]
    fn blank_and_null_target_values_count_as_missing() {
        let canonical = flat(r#"{"a": "A", "b": "B", "c": "C", "d": "D"}"#);
        let target = flat(r#"{"a": "", "b": "   ", "c": null, "d": "d"}"#);
        assert_eq!(missing_keys(&canonical, &target), ["a", "b", "c"]);
    }

    #[test]
    fn bundle_is_complete_against_itself() {
        let canonical = flat(r#"{"a": "A", "n": null, "blank": "", "x": {"y": "Y"}}"#);
        assert!(missing_keys(&canonical, &canonical).is_empty());
        assert!(is_complete(&canonical, &canonical));
    }

    #[test]
    fn source_texts_align_with_keys() {
        let canonical = flat(r#"{"greeting": "Hello", "farewell": "Bye"}"#);
        let keys = vec!["farewell".to_string(), "greeting".to_string()];
        assert_eq!(source_texts(&canonical, &keys), ["Bye", "Hello"]);
    }

    #[test]
    fn prune_stale_drops_only_unknown_keys() {
        let canonical = flat(r#"{"a": {"b": "B"}, "c": "C"}"#);
        let target = flat(r#"{"a": "old shape", "c": "c", "gone": "g"}"#);
        let (pruned, stale) = prune_stale(&canonical, &target);
        assert_eq!(stale, ["a", "gone"]);
        assert_eq!(pruned.keys().collect::<Vec<_>>(), ["c"]);

        let (untouched, none) = prune_stale(&canonical, &pruned);
        assert!(none.is_empty());
        assert_eq!(untouched, pruned);
    }
}
