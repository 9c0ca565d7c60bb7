//! キャッシュの保存先

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;

use super::{
    CacheKey,
    storage_file_name,
};
use crate::reconcile::TranslationSet;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to write cache entry '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cache lock was poisoned")]
    Poisoned,
}

/// 補完済み翻訳セットのコンテンツアドレス型ストア
///
/// `load` は失敗しない。存在しない、読めない、または壊れたエントリはミスとして扱い、
/// 呼び出し側が再生成する。同じキーへの書き込みは後勝ち。
pub trait ResultCache: Send + Sync {
    fn load(&self, unit: &str, key: &CacheKey) -> Option<TranslationSet>;

    /// # Errors
    /// エントリを保存できなかった場合にエラーを返す
    fn store(&self, unit: &str, key: &CacheKey, set: &TranslationSet) -> Result<(), CacheError>;
}

/// エントリごとに 1 つの JSON ファイルをディレクトリに置くキャッシュ
#[derive(Debug, Clone)]
pub struct FileCache {
    /// エントリファイルを置くディレクトリ
    directory: PathBuf,
}

impl FileCache {
    /// ディレクトリは最初の `store` で作成される
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    #[must_use]
    pub fn entry_path(&self, unit: &str, key: &CacheKey) -> PathBuf {
        self.directory.join(storage_file_name(unit, key))
    }
}

impl ResultCache for FileCache {
    fn load(&self, unit: &str, key: &CacheKey) -> Option<TranslationSet> {
        let path = self.entry_path(unit, key);
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(unit, path = %path.display(), "Cache miss");
                return None;
            }
            Err(err) => {
                tracing::warn!(unit, path = %path.display(), "Failed to read cache entry: {err}");
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(set) => Some(set),
            Err(err) => {
                tracing::warn!(
                    unit,
                    path = %path.display(),
                    "Ignoring corrupted cache entry: {err}"
                );
                None
            }
        }
    }

    fn store(&self, unit: &str, key: &CacheKey, set: &TranslationSet) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|source| CacheError::Io { path: self.directory.clone(), source })?;

        let path = self.entry_path(unit, key);
        let content = serde_json::to_vec_pretty(set)?;
        std::fs::write(&path, content).map_err(|source| CacheError::Io { path: path.clone(), source })?;

        tracing::debug!(unit, path = %path.display(), "Stored cache entry");
        Ok(())
    }
}

/// プロセス内キャッシュ（テストや 1 回限りの実行向け）
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// 保存用ファイル名ごとのエントリ
    entries: RwLock<HashMap<String, TranslationSet>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn load(&self, unit: &str, key: &CacheKey) -> Option<TranslationSet> {
        let entries = self.entries.read().ok()?;
        entries.get(&storage_file_name(unit, key)).cloned()
    }

    fn store(&self, unit: &str, key: &CacheKey, set: &TranslationSet) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        entries.insert(storage_file_name(unit, key), set.clone());
        Ok(())
    }
}
