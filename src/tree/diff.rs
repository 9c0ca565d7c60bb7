//! Missing-key detection between a source tree and a translated candidate.

use super::{
    KeyPath,
    LocaleTree,
    LocaleValue,
};

/// Lists the key paths of `source` that are absent, `null` or `""` in `candidate`.
///
/// Paths come out in pre-order following `source`'s key order. A key is
/// descended into only when both sides hold a nested tree there; any other
/// combination is compared as a leaf, so arrays are never walked and a
/// missing subtree is reported once at its own path.
///
/// Source leaves that are themselves `null` or `""` have nothing to carry
/// over and are never reported.
///
/// # Examples
/// ```
/// use locale_reconcile::tree::{LocaleTree, missing_keys};
/// use serde_json::json;
///
/// let source = LocaleTree::try_from(json!({ "greeting": "Hello", "farewell": "Goodbye" })).unwrap();
/// let candidate = LocaleTree::try_from(json!({ "greeting": "Hola" })).unwrap();
///
/// let missing: Vec<String> = missing_keys(&source, &candidate).iter().map(ToString::to_string).collect();
/// assert_eq!(missing, vec!["farewell"]);
/// ```
#[must_use]
pub fn missing_keys(source: &LocaleTree, candidate: &LocaleTree) -> Vec<KeyPath> {
    let mut missing = Vec::new();
    collect_missing(source, candidate, &KeyPath::default(), &mut missing);
    missing
}

/// Pre-order walk appending missing paths under `prefix`.
fn collect_missing(
    source: &LocaleTree,
    candidate: &LocaleTree,
    prefix: &KeyPath,
    missing: &mut Vec<KeyPath>,
) {
    for (key, source_value) in source {
        let path = prefix.child(key);
        match (source_value, candidate.get(key)) {
            (LocaleValue::Node(source_child), Some(LocaleValue::Node(candidate_child))) => {
                collect_missing(source_child, candidate_child, &path, missing);
            }
            (source_value, candidate_value) => {
                if source_value.is_missing() {
                    continue;
                }
                if candidate_value.is_none_or(LocaleValue::is_missing) {
                    missing.push(path);
                }
            }
        }
    }
}
