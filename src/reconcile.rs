//! フォールバックによる翻訳結果の補完
//!
//! 翻訳プロバイダーの結果をソースツリーと突き合わせ、要求された全ての言語が
//! ソースの全てのキーに値を持つようにする。欠けている部分は地域言語のベース言語、
//! 次にソースの順で補い、行った置き換えは全て [`FallbackRecord`] に記録する。

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

use crate::tree::{
    KeyPath,
    LocaleTree,
    LocaleValue,
    get_by_path,
    missing_keys,
    set_by_path,
};

/// Raw provider output: language code → translated tree, possibly incomplete.
pub type RawTranslations = IndexMap<String, LocaleTree>;

/// `FallbackRecord` をシリアライズする予約キー
pub const FALLBACK_RECORD_KEY: &str = "_fallbacks";

/// 1 つのコンテンツユニットの補完済み翻訳
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSet {
    /// 言語コード → 最終的なツリー。出力できない言語は含まれない
    #[serde(flatten)]
    pub languages: IndexMap<String, LocaleTree>,

    /// 置き換えが 1 つ以上あった場合のみ存在する
    #[serde(rename = "_fallbacks", default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackRecord>,
}

/// 補完時に行った置き換えの記録
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FallbackRecord {
    pub used: bool,
    /// ツリー全体をソースからコピーした言語
    pub languages_fallback_to_source: Vec<String>,
    /// 地域言語 → ツリーを借りたベース言語
    pub regional_fallbacks: IndexMap<String, String>,
    /// 言語 → 補完したキーのパス（ドット区切り）
    pub keys_fallback: IndexMap<String, Vec<String>>,
}

impl FallbackRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages_fallback_to_source.is_empty()
            && self.regional_fallbacks.is_empty()
            && self.keys_fallback.is_empty()
    }
}

/// 補完で許可する置き換え
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FallbackPolicy {
    /// ソース言語の内容で補う
    pub to_source: bool,
    /// 地域言語（`pt-BR`）がベース言語（`pt`）から借りる
    pub regional: bool,
}

impl TranslationSet {
    #[must_use]
    pub fn get(&self, language: &str) -> Option<&LocaleTree> {
        self.languages.get(language)
    }
}

/// `requested_targets` の最終的な翻訳セットを作る
///
/// 出力には要求された言語だけが含まれる。`raw` の追加言語（地域フォールバック用の
/// ベース言語など）は参照されるが返されない。置き換えの値は常に変更前の `raw` から
/// 読むため、結果は `requested_targets` の順序に依存しない。
///
/// 言語 `L` ごとに:
/// 1. `raw[L]` がない、または空の場合、ポリシーが許せば空でないベース言語のツリーを
///    コピーし、なければソースをコピーし、どちらも許可されなければ `L` を出力しない
/// 2. ソースへのフォールバックが有効なら、[`missing_keys`] が報告する全てのキーを
///    ベース言語の空でない値、なければソースの値で埋める。ベース言語から借りた
///    サブツリーに足りないキーもソースで埋めるので、結果はソースの全キーを持つ
#[must_use]
pub fn reconcile(
    raw: &RawTranslations,
    source: &LocaleTree,
    requested_targets: &[String],
    policy: FallbackPolicy,
    regional_map: &IndexMap<String, String>,
) -> TranslationSet {
    let mut record = FallbackRecord::default();
    let mut languages = IndexMap::with_capacity(requested_targets.len());

    for language in requested_targets {
        if languages.contains_key(language) {
            continue;
        }

        let regional_base = regional_map
            .get(language)
            .filter(|_| policy.regional)
            .and_then(|base| raw.get(base).map(|tree| (base, tree)));

        let reconciled = match raw.get(language).filter(|tree| !tree.is_empty()) {
            None => fill_whole_language(language, source, policy, regional_base, &mut record),
            Some(translated) => Some(translated.clone()),
        };
        let reconciled = reconciled.map(|tree| {
            if policy.to_source {
                fill_missing_keys(language, tree, source, regional_base, &mut record)
            } else {
                tree
            }
        });

        if let Some(tree) = reconciled {
            languages.insert(language.clone(), tree);
        } else {
            tracing::debug!(language = %language, "No translation produced");
        }
    }

    let fallback = (!record.is_empty()).then(|| FallbackRecord { used: true, ..record });
    TranslationSet { languages, fallback }
}

/// プロバイダーが何も返さなかった言語の代わりのツリーを選ぶ
fn fill_whole_language(
    language: &str,
    source: &LocaleTree,
    policy: FallbackPolicy,
    regional_base: Option<(&String, &LocaleTree)>,
    record: &mut FallbackRecord,
) -> Option<LocaleTree> {
    if let Some((base, base_tree)) = regional_base.filter(|(_, tree)| !tree.is_empty()) {
        record.regional_fallbacks.insert(language.to_string(), base.clone());
        return Some(base_tree.clone());
    }

    if policy.to_source {
        record.languages_fallback_to_source.push(language.to_string());
        return Some(source.clone());
    }

    None
}

/// `tree` の欠けているキーを全て埋める
fn fill_missing_keys(
    language: &str,
    mut tree: LocaleTree,
    source: &LocaleTree,
    regional_base: Option<(&String, &LocaleTree)>,
    record: &mut FallbackRecord,
) -> LocaleTree {
    let missing = missing_keys(source, &tree);
    if missing.is_empty() {
        return tree;
    }

    for path in &missing {
        if let Some(value) = substitute_for(path, source, regional_base) {
            set_by_path(&mut tree, path, value.clone());
        }
    }

    // ベース言語から借りたサブツリー自体が不完全な場合の残り
    for path in missing_keys(source, &tree) {
        if let Some(value) = get_by_path(source, &path) {
            set_by_path(&mut tree, &path, value.clone());
        }
    }

    record
        .keys_fallback
        .insert(language.to_string(), missing.iter().map(KeyPath::to_string).collect());
    tree
}

/// ベース言語の値を優先し、なければソースの値
fn substitute_for<'a>(
    path: &KeyPath,
    source: &'a LocaleTree,
    regional_base: Option<(&String, &'a LocaleTree)>,
) -> Option<&'a LocaleValue> {
    regional_base
        .and_then(|(_, base_tree)| get_by_path(base_tree, path))
        .filter(|value| !value.is_missing())
        .or_else(|| get_by_path(source, path))
}
