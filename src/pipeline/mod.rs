//! コンテンツ単位ごとの翻訳フロー
//!
//! 各コンテンツ単位について、キャッシュキーを求め、キャッシュがあればそれを使う。
//! なければ対象言語を展開してプロバイダーを一度だけ呼び、ソースと照合して補完した
//! 結果をキャッシュと Sink に保存する。

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::cache::{
    FileCache,
    ResultCache,
    derive_key,
};
use crate::config::{
    ConfigError,
    TranslateSettings,
};
use crate::language::expand;
use crate::provider::TranslationProvider;
use crate::reconcile::{
    FallbackRecord,
    RawTranslations,
    TranslationSet,
    reconcile,
};
use crate::sink::{
    DirectorySink,
    Sink,
    SinkError,
};
use crate::source::{
    ContentUnit,
    SourceError,
    load_content_units,
};
use crate::tree::TreeError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// コンテンツが JSON オブジェクトではない
    #[error("Invalid content in unit '{unit}': {source}")]
    Tree {
        unit: String,
        #[source]
        source: TreeError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// 1 つのコンテンツ単位の翻訳結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub unit: String,
    /// キャッシュから取得し、プロバイダーを呼ばなかった
    pub cache_hit: bool,
    /// Sink に書き込んだ言語（要求順）
    pub languages: Vec<String>,
    pub fallback: Option<FallbackRecord>,
}

impl UnitReport {
    /// 書き込んだ翻訳セットからレポートを作る
    fn new(unit: &ContentUnit, cache_hit: bool, set: TranslationSet) -> Self {
        Self {
            unit: unit.name.clone(),
            cache_hit,
            languages: set.languages.into_keys().collect(),
            fallback: set.fallback,
        }
    }
}

/// 検証済みの設定による 1 回の翻訳実行
pub struct TranslationJob<'a> {
    /// 全てのコンテンツ単位で共有する設定
    settings: &'a TranslateSettings,
    /// キャッシュミスごとに一度呼ばれる翻訳バックエンド
    provider: &'a dyn TranslationProvider,
    /// キャッシュが無効な場合は `None`
    cache: Option<&'a dyn ResultCache>,
    /// 言語ごとのツリーの出力先
    sink: &'a dyn Sink,
}

impl fmt::Debug for TranslationJob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationJob")
            .field("settings", self.settings)
            .field("provider", &self.provider.provider_name())
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> TranslationJob<'a> {
    /// `settings` を検証してジョブを作成
    ///
    /// `settings.cache.enabled` が false の場合、`cache` は使われない。
    ///
    /// # Errors
    /// 設定が不正な場合は [`PipelineError::Config`] を返す
    pub fn new(
        settings: &'a TranslateSettings,
        provider: &'a dyn TranslationProvider,
        cache: Option<&'a dyn ResultCache>,
        sink: &'a dyn Sink,
    ) -> Result<Self, PipelineError> {
        settings.validate().map_err(ConfigError::ValidationErrors)?;
        let cache = cache.filter(|_| settings.cache.enabled);
        Ok(Self { settings, provider, cache, sink })
    }

    /// 全てのコンテンツ単位を順に翻訳
    ///
    /// 最初に失敗した単位で止まる。翻訳の欠落では失敗しない。
    pub async fn run(&self, units: &[ContentUnit]) -> Result<Vec<UnitReport>, PipelineError> {
        let mut reports = Vec::with_capacity(units.len());
        for unit in units {
            reports.push(self.translate_unit(unit).await?);
        }

        let cache_hits = reports.iter().filter(|report| report.cache_hit).count();
        tracing::info!(units = reports.len(), cache_hits, "Translation run finished");
        Ok(reports)
    }

    /// 1 つのコンテンツ単位を翻訳する。キャッシュがあればそれを再生する
    pub async fn translate_unit(&self, unit: &ContentUnit) -> Result<UnitReport, PipelineError> {
        let targets = self.settings.target_languages();
        let key = derive_key(&unit.raw, targets);

        if let Some(cache) = self.cache
            && let Some(set) = cache.load(&unit.name, &key)
        {
            tracing::debug!(unit = %unit.name, key = %key, "Using cached translations");
            self.write_set(&unit.name, &set)?;
            return Ok(UnitReport::new(unit, true, set));
        }

        let source = unit
            .source_tree()
            .map_err(|source| PipelineError::Tree { unit: unit.name.clone(), source })?;

        let expansion = expand(targets, self.settings.regional_fallback);
        tracing::debug!(
            unit = %unit.name,
            provider = self.provider.provider_name(),
            languages = ?expansion.provider_targets,
            "Requesting translations"
        );

        let (raw, provider_failed) = match self
            .provider
            .translate(&source, &self.settings.source_language, &expansion.provider_targets)
            .await
        {
            Ok(raw) => (raw, false),
            Err(err) => {
                tracing::warn!(
                    unit = %unit.name,
                    provider = self.provider.provider_name(),
                    "Translation provider failed, treating every language as missing: {err}"
                );
                (RawTranslations::new(), true)
            }
        };

        let set = reconcile(
            &raw,
            &source,
            &expansion.requested_targets,
            self.settings.fallback_policy(),
            &expansion.regional_map,
        );
        if let Some(record) = &set.fallback {
            log_fallbacks(&unit.name, record);
        }

        // 失敗したリクエストは補完結果を再生せず、次回の実行で再試行する
        if let Some(cache) = self.cache
            && !provider_failed
            && let Err(err) = cache.store(&unit.name, &key, &set)
        {
            tracing::warn!(unit = %unit.name, "Failed to store cache entry: {err}");
        }

        self.write_set(&unit.name, &set)?;
        tracing::info!(unit = %unit.name, languages = set.languages.len(), "Translated unit");
        Ok(UnitReport::new(unit, false, set))
    }

    /// `set` に含まれる全ての言語を Sink に渡す
    fn write_set(&self, unit: &str, set: &TranslationSet) -> Result<(), SinkError> {
        for (language, tree) in &set.languages {
            self.sink.write(unit, language, tree)?;
        }
        Ok(())
    }
}

/// 補完で置き換えた内容をログに出力
fn log_fallbacks(unit: &str, record: &FallbackRecord) {
    for language in &record.languages_fallback_to_source {
        tracing::info!(unit, language = %language, "No translation returned, using source content");
    }
    for (language, base) in &record.regional_fallbacks {
        tracing::info!(unit, language = %language, base = %base, "Using base language translation");
    }
    for (language, keys) in &record.keys_fallback {
        tracing::info!(unit, language = %language, count = keys.len(), ?keys, "Filled missing keys");
    }
}

/// `workspace_root` 以下のプロジェクトを翻訳
///
/// `settings` のディレクトリは `workspace_root` からの相対パスとして解決する。
/// 結果は [`DirectorySink`] に書き込み、有効な場合は [`FileCache`] にも保存する。
///
/// # Errors
/// 設定が不正、ソースが読めない、コンテンツが不正、または書き込みに失敗した場合に
/// [`PipelineError`] を返す
pub async fn translate_workspace(
    workspace_root: &Path,
    settings: &TranslateSettings,
    provider: &dyn TranslationProvider,
) -> Result<Vec<UnitReport>, PipelineError> {
    tracing::debug!(workspace_root = %workspace_root.display(), "Translating workspace");

    let cache = FileCache::new(workspace_root.join(&settings.cache.directory));
    let sink = DirectorySink::new(workspace_root.join(&settings.output_directory));
    let job = TranslationJob::new(settings, provider, Some(&cache), &sink)?;

    let units = load_content_units(
        &workspace_root.join(&settings.source_directory),
        &settings.file_patterns,
    )
    .await?;

    job.run(&units).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::cache::{
        CacheError,
        CacheKey,
        MemoryCache,
    };
    use crate::provider::{
        MockMode,
        MockProvider,
        ProviderError,
    };
    use crate::test_utils::{
        languages,
        tree,
    };
    use crate::tree::LocaleTree;

    /// 書き込まれた内容を記録する Sink
    #[derive(Debug, Default)]
    struct RecordingSink {
        /// (unit, language, tree)
        writes: Mutex<Vec<(String, String, LocaleTree)>>,
    }

    impl RecordingSink {
        fn written(&self) -> Vec<(String, String, LocaleTree)> {
            self.writes.lock().unwrap().clone()
        }

        fn languages(&self) -> Vec<String> {
            self.written().into_iter().map(|(_, language, _)| language).collect()
        }
    }

    impl Sink for RecordingSink {
        fn write(&self, unit: &str, language: &str, tree: &LocaleTree) -> Result<(), SinkError> {
            self.writes.lock().unwrap().push((unit.to_string(), language.to_string(), tree.clone()));
            Ok(())
        }
    }

    /// 保存に常に失敗するキャッシュ
    #[derive(Debug)]
    struct ReadOnlyCache;

    impl ResultCache for ReadOnlyCache {
        fn load(&self, _unit: &str, _key: &CacheKey) -> Option<TranslationSet> {
            None
        }

        fn store(&self, _unit: &str, _key: &CacheKey, _set: &TranslationSet) -> Result<(), CacheError> {
            Err(CacheError::Poisoned)
        }
    }

    fn settings(targets: &[&str]) -> TranslateSettings {
        TranslateSettings {
            target_languages: Some(languages(targets)),
            ..TranslateSettings::default()
        }
    }

    fn common_unit() -> ContentUnit {
        ContentUnit::new("common", r#"{"greeting": "Hello", "farewell": "Goodbye"}"#)
    }

    #[tokio::test]
    async fn test_translate_unit_writes_every_target() {
        let settings = settings(&["es", "fr"]);
        let provider = MockProvider::new(MockMode::Suffix);
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();

        let report = job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(report.unit, eq("common"));
        assert_that!(report.cache_hit, eq(false));
        assert_that!(report.languages, elements_are![eq("es"), eq("fr")]);
        assert_that!(report.fallback, none());
        assert_eq!(
            sink.written(),
            vec![
                (
                    "common".to_string(),
                    "es".to_string(),
                    tree(json!({ "greeting": "Hello_es", "farewell": "Goodbye_es" }))
                ),
                (
                    "common".to_string(),
                    "fr".to_string(),
                    tree(json!({ "greeting": "Hello_fr", "farewell": "Goodbye_fr" }))
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_regional_target_borrows_from_base() {
        let settings = settings(&["pt-BR"]);
        let provider = MockProvider::new(MockMode::Omit(languages(&["pt-BR"])));
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();

        let report = job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(sink.languages(), elements_are![eq("pt-BR")]);
        assert_eq!(
            sink.written()[0].2,
            tree(json!({ "greeting": "Hello_pt", "farewell": "Goodbye_pt" }))
        );
        let record = report.fallback.unwrap();
        assert_eq!(record.regional_fallbacks.get("pt-BR").map(String::as_str), Some("pt"));
    }

    #[tokio::test]
    async fn test_partial_provider_output_is_filled_from_source() {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Partial(languages(&["farewell"])));
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();

        let report = job.translate_unit(&common_unit()).await.unwrap();

        assert_eq!(sink.written()[0].2, tree(json!({ "greeting": "Hello_es", "farewell": "Goodbye" })));
        let record = report.fallback.unwrap();
        assert_that!(record.keys_fallback["es"], elements_are![eq("farewell")]);
    }

    #[rstest]
    #[case::service_error(MockMode::Error(ProviderError::Service("quota exceeded".to_string())))]
    #[case::transport_error(MockMode::Error(ProviderError::Transport("connection reset".to_string())))]
    #[case::no_op(MockMode::NoOp)]
    #[tokio::test]
    async fn test_empty_provider_output_falls_back_to_source(#[case] mode: MockMode) {
        let settings = settings(&["es", "de"]);
        let provider = MockProvider::new(mode);
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();

        let report = job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(sink.languages(), elements_are![eq("es"), eq("de")]);
        for (_, _, written) in sink.written() {
            assert_eq!(written, tree(json!({ "greeting": "Hello", "farewell": "Goodbye" })));
        }
        assert_that!(
            report.fallback.unwrap().languages_fallback_to_source,
            elements_are![eq("es"), eq("de")]
        );
    }

    #[tokio::test]
    async fn test_missing_language_without_source_fallback_is_not_written() {
        let settings = TranslateSettings { fallback_to_source: false, ..settings(&["es", "fr"]) };
        let provider = MockProvider::new(MockMode::Omit(languages(&["fr"])));
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();

        let report = job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(sink.languages(), elements_are![eq("es")]);
        assert_that!(report.languages, elements_are![eq("es")]);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Suffix);
        let cache = MemoryCache::new();
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, Some(&cache), &sink).unwrap();

        let first = job.translate_unit(&common_unit()).await.unwrap();
        let second = job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(provider.call_count(), eq(1));
        assert_that!(first.cache_hit, eq(false));
        assert_that!(second.cache_hit, eq(true));
        assert_that!(second.languages, eq(&first.languages));
        let written = sink.written();
        assert_that!(written.len(), eq(2));
        assert_eq!(written[0], written[1]);
    }

    #[tokio::test]
    async fn test_changed_content_misses_cache() {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Suffix);
        let cache = MemoryCache::new();
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, Some(&cache), &sink).unwrap();

        job.translate_unit(&common_unit()).await.unwrap();
        let changed = ContentUnit::new("common", r#"{"greeting": "Hi", "farewell": "Goodbye"}"#);
        let report = job.translate_unit(&changed).await.unwrap();

        assert_that!(report.cache_hit, eq(false));
        assert_that!(provider.call_count(), eq(2));
        assert_that!(cache.len(), eq(2));
    }

    #[tokio::test]
    async fn test_disabled_cache_is_ignored() {
        let mut settings = settings(&["es"]);
        settings.cache.enabled = false;
        let provider = MockProvider::new(MockMode::Suffix);
        let cache = MemoryCache::new();
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, Some(&cache), &sink).unwrap();

        job.translate_unit(&common_unit()).await.unwrap();
        job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(provider.call_count(), eq(2));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_cached() {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Error(ProviderError::Transport("timeout".to_string())));
        let cache = MemoryCache::new();
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, Some(&cache), &sink).unwrap();

        job.translate_unit(&common_unit()).await.unwrap();

        assert!(cache.is_empty());
        assert_that!(sink.languages(), elements_are![eq("es")]);
    }

    #[tokio::test]
    async fn test_failed_cache_store_is_not_fatal() {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Suffix);
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, Some(&ReadOnlyCache), &sink).unwrap();

        let report = job.translate_unit(&common_unit()).await.unwrap();

        assert_that!(report.languages, elements_are![eq("es")]);
        assert_that!(sink.languages(), elements_are![eq("es")]);
    }

    #[rstest]
    #[case::array("[\"Hello\"]")]
    #[case::string("\"Hello\"")]
    #[case::invalid_json("{ \"greeting\": ")]
    #[tokio::test]
    async fn test_malformed_content_fails_the_unit(#[case] content: &str) {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Suffix);
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();

        let result = job.translate_unit(&ContentUnit::new("broken", content)).await;

        let Err(PipelineError::Tree { unit, .. }) = result else {
            panic!("expected a tree error, got {result:?}");
        };
        assert_that!(unit, eq("broken"));
        assert_that!(provider.call_count(), eq(0));
        assert!(sink.written().is_empty());
    }

    #[rstest]
    fn test_new_rejects_invalid_settings() {
        let settings = TranslateSettings::default();
        let provider = MockProvider::new(MockMode::Suffix);
        let sink = RecordingSink::default();

        let result = TranslationJob::new(&settings, &provider, None, &sink);

        assert!(matches!(result, Err(PipelineError::Config(ConfigError::ValidationErrors(_)))));
    }

    #[tokio::test]
    async fn test_run_processes_units_in_order() {
        let settings = settings(&["es"]);
        let provider = MockProvider::new(MockMode::Suffix);
        let sink = RecordingSink::default();
        let job = TranslationJob::new(&settings, &provider, None, &sink).unwrap();
        let units = vec![
            ContentUnit::new("common", r#"{"greeting": "Hello"}"#),
            ContentUnit::new("admin/errors", r#"{"notFound": "Not found"}"#),
        ];

        let reports = job.run(&units).await.unwrap();

        assert_that!(
            reports,
            elements_are![
                field!(UnitReport.unit, eq("common")),
                field!(UnitReport.unit, eq("admin/errors"))
            ]
        );
        assert_that!(provider.call_count(), eq(2));
    }
}
