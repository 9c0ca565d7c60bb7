//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    TranslateSettings,
};

/// ワークスペース直下の設定ファイル名
pub const CONFIG_FILE_NAME: &str = ".i18n-reconcile.json";

/// ワークスペースから設定を読み込む
///
/// `.i18n-reconcile.json` ファイルを探して読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<TranslateSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: TranslateSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}

/// 設定を読み込んでバリデーションする
///
/// 設定ファイルがない場合はデフォルト設定を使う。
/// `targetLanguages` は必須なので、その場合はバリデーションエラーになる。
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
/// - バリデーションエラー
pub fn load_settings(workspace_root: Option<&Path>) -> Result<TranslateSettings, ConfigError> {
    tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

    let settings = if let Some(root) = workspace_root {
        load_from_workspace(root)?.map_or_else(TranslateSettings::default, |ws| {
            tracing::debug!("Loaded workspace settings: {:?}", ws);
            ws
        })
    } else {
        TranslateSettings::default()
    };

    settings.validate().map_err(ConfigError::ValidationErrors)?;
    tracing::debug!("Settings loaded successfully: {:?}", settings);

    Ok(settings)
}
