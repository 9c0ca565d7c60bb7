use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::language::validate_language_code;
use crate::reconcile::FallbackPolicy;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "targetLanguages[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Renders one numbered line per error.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings for one translation run. Built once and passed by reference to
/// every step; nothing reads configuration from global state.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslateSettings {
    pub source_language: String,

    /// Languages to produce, in request order. Required.
    ///
    /// The order is part of the cache key, so reordering the list invalidates
    /// cached results.
    pub target_languages: Option<Vec<String>>,

    /// Directory holding the source-language content files.
    pub source_directory: String,
    /// Files are written to `<outputDirectory>/<language>/<unit>.json`.
    pub output_directory: String,
    /// Glob patterns, relative to `sourceDirectory`, selecting content files.
    pub file_patterns: Vec<String>,

    /// Fill missing languages and keys with source content.
    pub fallback_to_source: bool,
    /// Let `pt-BR` borrow from `pt` when its own translation is missing.
    pub regional_fallback: bool,

    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub directory: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, directory: ".translation-cache".to_string() }
    }
}

impl TranslateSettings {
    /// Requested target languages, empty when unset.
    #[must_use]
    pub fn target_languages(&self) -> &[String] {
        self.target_languages.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub const fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy { to_source: self.fallback_to_source, regional: self.regional_fallback }
    }

    /// # Errors
    /// - Target languages are missing or empty
    /// - Invalid language code
    /// - Target language equal to the source language
    /// - Empty or invalid glob pattern
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(message) = validate_language_code(&self.source_language) {
            errors.push(ValidationError::new("sourceLanguage", message));
        }

        match &self.target_languages {
            None => errors.push(ValidationError::new(
                "targetLanguages",
                "Target languages are required. Example: [\"es\", \"pt-BR\"]",
            )),
            Some(targets) if targets.is_empty() => errors.push(ValidationError::new(
                "targetLanguages",
                "At least one target language is required. Example: [\"es\", \"pt-BR\"]",
            )),
            Some(targets) => {
                for (index, code) in targets.iter().enumerate() {
                    if let Err(message) = validate_language_code(code) {
                        errors.push(ValidationError::new(format!("targetLanguages[{index}]"), message));
                    } else if *code == self.source_language {
                        errors.push(ValidationError::new(
                            format!("targetLanguages[{index}]"),
                            format!("'{code}' is the source language and cannot be a target"),
                        ));
                    }
                }
            }
        }

        if self.source_directory.is_empty() {
            errors.push(ValidationError::new(
                "sourceDirectory",
                "The directory cannot be empty. Example: \"locales/en\"",
            ));
        }

        if self.output_directory.is_empty() {
            errors.push(ValidationError::new(
                "outputDirectory",
                "The directory cannot be empty. Example: \"locales\"",
            ));
        }

        if self.file_patterns.is_empty() {
            errors.push(ValidationError::new(
                "filePatterns",
                "At least one pattern is required. Example: [\"**/*.json\"]",
            ));
        }

        for (index, pattern) in self.file_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("filePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.cache.enabled && self.cache.directory.is_empty() {
            errors.push(ValidationError::new(
                "cache.directory",
                "The directory cannot be empty while the cache is enabled",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslateSettings {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_languages: None,
            source_directory: "locales/en".to_string(),
            output_directory: "locales".to_string(),
            file_patterns: vec!["**/*.json".to_string()],
            fallback_to_source: true,
            regional_fallback: true,
            cache: CacheConfig::default(),
        }
    }
}
