//! Mock translation provider
//!
//! Produces deterministic output without any network access, so the whole
//! pipeline can be exercised in tests.
//!
//! # Example
//!
//! ```
//! use locale_reconcile::provider::{MockMode, MockProvider, TranslationProvider};
//! use locale_reconcile::tree::LocaleTree;
//! use serde_json::json;
//!
//! # block_on(async {
//! let provider = MockProvider::new(MockMode::Suffix);
//! let source = LocaleTree::try_from(json!({ "greeting": "Hello" })).unwrap();
//! let raw = provider.translate(&source, "en", &["es".to_string()]).await.unwrap();
//! assert_eq!(raw["es"].get("greeting").and_then(|v| v.as_str()), Some("Hello_es"));
//! # });
//! # fn block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```

use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    ProviderError,
    TranslationProvider,
};
use crate::reconcile::RawTranslations;
use crate::tree::{
    KeyPath,
    LocaleTree,
    LocaleValue,
    remove_by_path,
};

/// Behaviours the mock provider can simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockMode {
    /// Append `_<lang>` to every string leaf: "Hello" → "Hello_es"
    Suffix,
    /// Like `Suffix`, but the listed languages are missing from the output
    Omit(Vec<String>),
    /// Like `Suffix`, but the listed dotted keys are dropped from every language
    Partial(Vec<String>),
    /// Fail the whole request with the given error
    Error(ProviderError),
    /// Return no languages at all
    NoOp,
}

/// Mock provider with a call counter.
#[derive(Debug)]
pub struct MockProvider {
    /// Simulated behaviour
    mode: MockMode,
    /// Number of `translate` calls
    calls: AtomicUsize,
}

impl MockProvider {
    #[must_use]
    pub const fn new(mode: MockMode) -> Self {
        Self { mode, calls: AtomicUsize::new(0) }
    }

    /// Number of `translate` calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate(
        &self,
        source: &LocaleTree,
        _source_language: &str,
        target_languages: &[String],
    ) -> Result<RawTranslations, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (omitted, dropped_keys): (&[String], &[String]) = match &self.mode {
            MockMode::Error(error) => return Err(error.clone()),
            MockMode::NoOp => return Ok(RawTranslations::new()),
            MockMode::Suffix => (&[], &[]),
            MockMode::Omit(languages) => (languages.as_slice(), &[]),
            MockMode::Partial(keys) => (&[], keys.as_slice()),
        };

        let mut raw = RawTranslations::with_capacity(target_languages.len());
        for language in target_languages.iter().filter(|language| !omitted.contains(language)) {
            let mut translated = suffix_tree(source, language);
            for key in dropped_keys {
                remove_by_path(&mut translated, &KeyPath::parse(key));
            }
            raw.insert(language.clone(), translated);
        }
        Ok(raw)
    }

    fn provider_name(&self) -> &str {
        "Mock Provider"
    }
}

/// Appends `_<language>` to every string leaf of `tree`.
fn suffix_tree(tree: &LocaleTree, language: &str) -> LocaleTree {
    tree.iter()
        .map(|(key, value)| {
            let translated = match value {
                LocaleValue::Node(child) => LocaleValue::Node(suffix_tree(child, language)),
                LocaleValue::Leaf(Value::String(text)) => format!("{text}_{language}").into(),
                LocaleValue::Leaf(other) => LocaleValue::Leaf(other.clone()),
            };
            (key.clone(), translated)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{
        languages,
        tree,
    };

    fn source() -> LocaleTree {
        tree(json!({
            "greeting": "Hello",
            "nav": { "home": "Home" },
            "count": 3,
            "items": ["a"]
        }))
    }

    #[tokio::test]
    async fn test_suffix_mode() {
        let provider = MockProvider::new(MockMode::Suffix);

        let raw = provider.translate(&source(), "en", &languages(&["es", "fr"])).await.unwrap();

        assert_eq!(raw.len(), 2);
        assert_eq!(
            raw["fr"],
            tree(json!({
                "greeting": "Hello_fr",
                "nav": { "home": "Home_fr" },
                "count": 3,
                "items": ["a"]
            }))
        );
        assert_that!(provider.call_count(), eq(1));
    }

    #[tokio::test]
    async fn test_omit_mode_drops_languages() {
        let provider = MockProvider::new(MockMode::Omit(languages(&["pt-BR"])));

        let raw = provider.translate(&source(), "en", &languages(&["pt", "pt-BR"])).await.unwrap();

        let codes: Vec<&String> = raw.keys().collect();
        assert_eq!(codes, vec!["pt"]);
    }

    #[tokio::test]
    async fn test_partial_mode_drops_keys() {
        let provider = MockProvider::new(MockMode::Partial(vec!["nav.home".to_string()]));

        let raw = provider.translate(&source(), "en", &languages(&["es"])).await.unwrap();

        assert_eq!(
            raw["es"],
            tree(json!({ "greeting": "Hello_es", "nav": {}, "count": 3, "items": ["a"] }))
        );
    }

    #[rstest]
    #[case::service(ProviderError::Service("quota exceeded".to_string()))]
    #[case::transport(ProviderError::Transport("connection reset".to_string()))]
    #[tokio::test]
    async fn test_error_mode_returns_configured_error(#[case] error: ProviderError) {
        let provider = MockProvider::new(MockMode::Error(error.clone()));

        let result = provider.translate(&source(), "en", &languages(&["es"])).await;

        assert_that!(result, err(eq(&error)));
        assert_that!(provider.call_count(), eq(1));
    }

    #[tokio::test]
    async fn test_noop_mode_returns_nothing() {
        let provider = MockProvider::new(MockMode::NoOp);

        let raw = provider.translate(&source(), "en", &languages(&["es"])).await.unwrap();

        assert!(raw.is_empty());
        assert_that!(provider.call_count(), eq(1));
    }

    #[rstest]
    fn test_provider_name() {
        assert_that!(MockProvider::new(MockMode::NoOp).provider_name(), eq("Mock Provider"));
    }
}
