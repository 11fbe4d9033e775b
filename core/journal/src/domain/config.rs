//! アプリ設定（起動時に一度だけ作る不変値）
//!
//! 優先順位: 環境変数 > config.json > 既定値

use super::access::AllowList;
use common::error::Error;
use serde::Deserialize;

pub const DEFAULT_PHOTO_BUCKET: &str = "photos";

pub const ENV_SUPABASE_URL: &str = "JOURNAL_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "JOURNAL_SUPABASE_ANON_KEY";
pub const ENV_ALLOWED_UIDS: &str = "JOURNAL_ALLOWED_UIDS";
pub const ENV_MAPS_API_KEY: &str = "JOURNAL_MAPS_API_KEY";
pub const ENV_PHOTO_BUCKET: &str = "JOURNAL_PHOTO_BUCKET";

/// allowed_uids は配列でもカンマ区切り文字列でもよい
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UidList {
    List(Vec<String>),
    Csv(String),
}

impl UidList {
    fn to_allow_list(&self) -> AllowList {
        match self {
            Self::List(ids) => AllowList::from_ids(ids),
            Self::Csv(csv) => AllowList::parse(csv),
        }
    }
}

/// config.json の内容（すべて任意）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub allowed_uids: Option<UidList>,
    #[serde(default)]
    pub maps_api_key: Option<String>,
    #[serde(default)]
    pub photo_bucket: Option<String>,
}

/// バックエンドの接続先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendEndpoint<'a> {
    pub url: &'a str,
    pub anon_key: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub allow_list: AllowList,
    pub maps_api_key: Option<String>,
    pub photo_bucket: String,
}

impl AppConfig {
    /// ファイルの値に環境変数を重ねる。`var` は空文字を未設定として返すこと。
    pub fn resolve(file: ConfigFile, var: impl Fn(&str) -> Option<String>) -> Self {
        let allow_list = match var(ENV_ALLOWED_UIDS) {
            Some(csv) => AllowList::parse(&csv),
            None => file
                .allowed_uids
                .as_ref()
                .map(UidList::to_allow_list)
                .unwrap_or_default(),
        };
        Self {
            supabase_url: var(ENV_SUPABASE_URL).or(file.supabase_url),
            supabase_anon_key: var(ENV_SUPABASE_ANON_KEY).or(file.supabase_anon_key),
            allow_list,
            maps_api_key: var(ENV_MAPS_API_KEY).or(file.maps_api_key),
            photo_bucket: var(ENV_PHOTO_BUCKET)
                .or(file.photo_bucket)
                .unwrap_or_else(|| DEFAULT_PHOTO_BUCKET.to_string()),
        }
    }

    /// リモートを使うコマンドの前提（URL と公開キー）
    pub fn backend(&self) -> Result<BackendEndpoint<'_>, Error> {
        match (self.supabase_url.as_deref(), self.supabase_anon_key.as_deref()) {
            (Some(url), Some(anon_key)) => Ok(BackendEndpoint { url, anon_key }),
            (None, _) => Err(Error::env(format!(
                "backend URL is not configured (set {} or supabase_url in config.json)",
                ENV_SUPABASE_URL
            ))),
            (_, None) => Err(Error::env(format!(
                "backend key is not configured (set {} or supabase_anon_key in config.json)",
                ENV_SUPABASE_ANON_KEY
            ))),
        }
    }

    pub fn maps_api_key(&self) -> Result<&str, Error> {
        self.maps_api_key.as_deref().ok_or_else(|| {
            Error::env(format!(
                "maps API key is not configured (set {} or maps_api_key in config.json)",
                ENV_MAPS_API_KEY
            ))
        })
    }
}
