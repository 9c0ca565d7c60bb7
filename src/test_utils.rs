//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use serde_json::Value;

use crate::tree::LocaleTree;

/// JSON リテラルから `LocaleTree` を作成する
///
/// # Arguments
/// * `value` - ルートがオブジェクトの JSON 値
pub(crate) fn tree(value: Value) -> LocaleTree {
    LocaleTree::try_from(value).unwrap()
}

/// 言語コードのリストを作成する
pub(crate) fn languages(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| (*code).to_string()).collect()
}
