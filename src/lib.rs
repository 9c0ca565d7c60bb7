//! locale-reconcile
//!
//! 構造化されたロケールファイルを複数言語へ翻訳し、翻訳サービスの結果が
//! 欠けていても全ての言語・全てのキーが揃った翻訳セットを作るライブラリ
//!
//! Flow per content unit: [`cache::derive_key`] → [`cache::ResultCache`] →
//! [`language::expand`] → [`provider::TranslationProvider`] →
//! [`reconcile::reconcile`] → [`sink::Sink`].

pub mod cache;
pub mod config;
pub mod language;
pub mod pipeline;
pub mod provider;
pub mod reconcile;
pub mod sink;
pub mod source;
pub mod tree;

#[cfg(test)]
mod test_utils;

pub use pipeline::{
    PipelineError,
    TranslationJob,
    UnitReport,
    translate_workspace,
};
pub use reconcile::{
    FallbackPolicy,
    FallbackRecord,
    TranslationSet,
    reconcile,
};
