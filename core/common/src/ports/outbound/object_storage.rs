//! オブジェクトストレージ Outbound ポート
//!
//! 写真のアップロードと公開 URL の解決。

use crate::error::Error;

/// アップロード 1 件分
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub bucket: &'a str,
    pub path: &'a str,
    pub bytes: &'a [u8],
    pub content_type: &'a str,
    /// false のとき既存オブジェクトがあればエラー
    pub upsert: bool,
}

pub trait ObjectStorage: Send + Sync {
    /// アップロードしてバケット内のパスを返す
    fn upload(&self, upload: Upload<'_>) -> Result<String, Error>;

    /// パスから公開 URL を組み立てる（通信しない）
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
