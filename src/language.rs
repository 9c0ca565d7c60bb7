//! Language codes and target-language expansion.
//!
//! A code is either bare (`es`) or region-qualified (`pt-BR`). The part
//! before the first `-` is the base language. When regional fallback is on,
//! every region-qualified target pulls its base language into the provider
//! request so a missing regional translation can borrow from it.

use indexmap::{
    IndexMap,
    IndexSet,
};

/// Result of expanding the requested target languages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionResult {
    /// Requested targets, deduplicated in first-seen order.
    pub requested_targets: Vec<String>,
    /// Languages to ask the provider for. No duplicates, first-seen order.
    pub provider_targets: Vec<String>,
    /// Region-qualified requested code → its base language.
    pub regional_map: IndexMap<String, String>,
}

/// Returns the base language of a region-qualified code.
///
/// `None` for bare codes and for codes with an empty part on either side of
/// the first `-`.
///
/// # Examples
/// ```
/// use locale_reconcile::language::base_language;
///
/// assert_eq!(base_language("pt-BR"), Some("pt"));
/// assert_eq!(base_language("sr-Cyrl-BA"), Some("sr"));
/// assert_eq!(base_language("es"), None);
/// ```
#[must_use]
pub fn base_language(code: &str) -> Option<&str> {
    let (base, region) = code.split_once('-')?;
    (!base.is_empty() && !region.is_empty()).then_some(base)
}

#[must_use]
pub fn is_region_qualified(code: &str) -> bool {
    base_language(code).is_some()
}

/// Checks that a language code is non-empty and only uses ASCII
/// alphanumerics, `-` and `_`.
///
/// # Errors
/// Returns a human readable reason when the code is rejected.
pub fn validate_language_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Language code is empty".to_string());
    }

    if let Some(invalid) =
        code.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(format!("Invalid character '{invalid}' in language code '{code}'"));
    }

    Ok(())
}

/// Expands the requested target languages into the provider request.
///
/// With `regional_fallback` off the targets pass through deduplicated. With it
/// on, each region-qualified code `L` with base `B` records `L → B` in the
/// regional map (even when `B` is itself requested) and, unless `B` was
/// requested or already added, inserts `B` just before the first `L` that
/// needs it.
///
/// # Examples
/// ```
/// use locale_reconcile::language::expand;
///
/// let result = expand(&["zh-CN".to_string(), "zh-TW".to_string()], true);
/// assert_eq!(result.provider_targets, vec!["zh", "zh-CN", "zh-TW"]);
/// assert_eq!(result.regional_map.get("zh-TW").map(String::as_str), Some("zh"));
/// ```
#[must_use]
pub fn expand(target_languages: &[String], regional_fallback: bool) -> ExpansionResult {
    let requested: IndexSet<&str> = target_languages.iter().map(String::as_str).collect();
    let mut provider_targets: IndexSet<String> = IndexSet::with_capacity(requested.len());
    let mut regional_map = IndexMap::new();

    for code in &requested {
        if regional_fallback && let Some(base) = base_language(code) {
            regional_map.insert((*code).to_string(), base.to_string());
            if !requested.contains(base) {
                provider_targets.insert(base.to_string());
            }
        }
        provider_targets.insert((*code).to_string());
    }

    ExpansionResult {
        requested_targets: requested.into_iter().map(str::to_string).collect(),
        provider_targets: provider_targets.into_iter().collect(),
        regional_map,
    }
}
