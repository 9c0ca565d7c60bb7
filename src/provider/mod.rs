//! Translation provider seam
//!
//! The provider is the only asynchronous collaborator: it receives the source
//! tree once per content unit and returns whatever it managed to translate.
//! Partial or empty output is normal and is repaired by reconciliation.

/// Deterministic provider for tests and dry runs
mod mock;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::{
    MockMode,
    MockProvider,
};

use crate::reconcile::RawTranslations;
use crate::tree::LocaleTree;

/// Failures reported by a translation provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request did not reach the service or the response was lost
    #[error("Translation request failed: {0}")]
    Transport(String),
    /// The service answered with an error
    #[error("Translation service error: {0}")]
    Service(String),
}

/// A machine translation backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translates `source` into every language of `target_languages`.
    ///
    /// The returned map may lack languages or keys; it must not contain
    /// anything the caller did not ask for.
    ///
    /// # Errors
    /// Returns [`ProviderError`] when the request as a whole failed.
    async fn translate(
        &self,
        source: &LocaleTree,
        source_language: &str,
        target_languages: &[String],
    ) -> Result<RawTranslations, ProviderError>;

    /// Name used in logs.
    fn provider_name(&self) -> &str;
}
