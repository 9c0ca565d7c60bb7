//! コンテンツソース
//!
//! プロジェクトのソース言語の JSON ファイルを探し、それぞれを [`ContentUnit`] にする。
//! 単位名はソースディレクトリからの相対パスから `.json` 拡張子を除いたもの
//! （`common` や `admin/errors` など）。

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;
use thiserror::Error;

use crate::tree::{
    LocaleTree,
    TreeError,
};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),

    #[error("Failed to read source file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 名前付きのソース言語コンテンツ
///
/// キャッシュキーがディスク上の内容そのものを対象にするよう、生のバイト列で保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    pub name: String,
    pub raw: Vec<u8>,
}

impl ContentUnit {
    #[must_use]
    pub fn new(name: impl Into<String>, raw: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), raw: raw.into() }
    }

    /// 生の内容をパース
    ///
    /// # Errors
    /// 内容が JSON オブジェクトでない場合は [`TreeError`] を返す
    pub fn source_tree(&self) -> Result<LocaleTree, TreeError> {
        LocaleTree::from_slice(&self.raw)
    }
}

/// `source_dir` 以下で相対パスが `patterns` のいずれかにマッチするファイルを
/// パス順に列挙
///
/// `.gitignore` のルールに従い、シンボリックリンクはたどらない。
pub fn find_content_files(
    source_dir: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, SourceError> {
    if !source_dir.is_dir() {
        return Err(SourceError::DirectoryNotFound(source_dir.to_path_buf()));
    }

    let include_set = build_glob_set(patterns)?;
    let mut found_files = Vec::new();

    for result in WalkBuilder::new(source_dir)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(source_dir) else {
            continue;
        };
        if include_set.is_match(relative_path) {
            found_files.push(path.to_path_buf());
        }
    }

    found_files.sort();
    tracing::debug!(
        source_dir = %source_dir.display(),
        count = found_files.len(),
        "Found content files"
    );
    Ok(found_files)
}

/// `source_dir` 以下のマッチする全てのファイルを [`ContentUnit`] として読み込む
pub async fn load_content_units(
    source_dir: &Path,
    patterns: &[String],
) -> Result<Vec<ContentUnit>, SourceError> {
    let files = find_content_files(source_dir, patterns)?;
    let mut units = Vec::with_capacity(files.len());

    for path in files {
        let Some(name) = unit_name(source_dir, &path) else {
            tracing::warn!(path = %path.display(), "Skipping file with unusable name");
            continue;
        };
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|source| SourceError::Read { path: path.clone(), source })?;
        units.push(ContentUnit { name, raw });
    }

    Ok(units)
}

/// `locales/en` 以下の `locales/en/admin/errors.json` → `admin/errors`
fn unit_name(source_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(source_dir).ok()?.with_extension("");
    let segments: Option<Vec<&str>> =
        relative.components().map(|component| component.as_os_str().to_str()).collect();
    let name = segments?.join("/");
    (!name.is_empty()).then_some(name)
}

/// 設定されたパターンの GlobSet
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, SourceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| SourceError::InvalidPattern { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
