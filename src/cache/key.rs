//! Deterministic cache keys.

use std::fmt;

use sha2::{
    Digest,
    Sha256,
};

/// SHA-256 fingerprint of one translation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Lowercase hex rendering, 64 characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Derives the cache key for raw source bytes and an ordered target list.
///
/// The digest covers the exact bytes, not their JSON meaning, and the
/// languages in the order given: reordering the same languages yields a
/// different key. Every field is length-prefixed so no two distinct inputs
/// share an encoding.
///
/// # Examples
/// ```
/// use locale_reconcile::cache::derive_key;
///
/// let targets = vec!["es".to_string(), "pt-BR".to_string()];
/// let first = derive_key(br#"{"greeting":"Hello"}"#, &targets);
/// let second = derive_key(br#"{"greeting":"Hello"}"#, &targets);
/// assert_eq!(first, second);
/// assert_eq!(first.to_hex().len(), 64);
/// ```
#[must_use]
pub fn derive_key(raw_source: &[u8], target_languages: &[String]) -> CacheKey {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, raw_source);
    hasher.update((target_languages.len() as u64).to_le_bytes());
    for language in target_languages {
        update_field(&mut hasher, language.as_bytes());
    }

    let mut bytes = [0_u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    CacheKey(bytes)
}

/// Storage file name for a cache entry: `<unit-name>.<hex-digest>.json`.
///
/// Path separators in nested unit names are flattened to `_`.
#[must_use]
pub fn storage_file_name(unit: &str, key: &CacheKey) -> String {
    let flattened = unit.replace(['/', '\\'], "_");
    format!("{flattened}.{key}.json")
}

/// Feeds `bytes` prefixed with its length.
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
