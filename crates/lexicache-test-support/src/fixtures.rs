//! Sample bundles shared by the integration suites.

use anyhow::Result;
use lexicache_bundle::{LocaleCode, TreeNode, parse_bundle};

/// Canonical English copy used by the greeting/farewell scenarios.
pub const CANONICAL_JSON: &str = r#"{
    "greeting": "Hello",
    "farewell": "Bye",
    "nav": {
        "home": "Home",
        "cart": "Cart"
    }
}"#;

/// Parse a locale tag, failing the test on invalid input.
///
/// # Errors
///
/// Returns an error when `tag` is not a valid locale.
pub fn locale(tag: &str) -> Result<LocaleCode> {
    Ok(LocaleCode::parse(tag)?)
}

/// The canonical bundle from [`CANONICAL_JSON`].
///
/// # Errors
///
/// Returns an error if the fixture fails validation.
pub fn canonical_bundle() -> Result<TreeNode> {
    Ok(parse_bundle(CANONICAL_JSON)?)
}

/// Two-key canonical bundle: `greeting` and `farewell`.
///
/// # Errors
///
/// Returns an error if the fixture fails validation.
pub fn greeting_bundle() -> Result<TreeNode> {
    Ok(parse_bundle(r#"{"greeting": "Hello", "farewell": "Bye"}"#)?)
}

/// Hindi bundle with only `greeting` translated.
///
/// # Errors
///
/// Returns an error if the fixture fails validation.
pub fn partial_hindi_bundle() -> Result<TreeNode> {
    Ok(parse_bundle(r#"{"greeting": "नमस्ते"}"#)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_parse() -> Result<()> {
        assert_eq!(canonical_bundle()?.leaf_count(), 4);
        assert_eq!(greeting_bundle()?.lookup("farewell"), Some("Bye"));
        assert_eq!(partial_hindi_bundle()?.lookup("farewell"), None);
        assert_eq!(locale("HI")?.as_str(), "hi");
        Ok(())
    }
}
