//! ストレージ API（/storage/v1）を使う ObjectStorage 実装

use super::client::RestClient;
use crate::error::Error;
use crate::ports::outbound::{ObjectStorage, Upload};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

pub struct RestStorage {
    client: Arc<RestClient>,
}

impl RestStorage {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

pub fn object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{}/storage/v1/object/{}/{}", base_url, bucket, path.trim_start_matches('/'))
}

pub fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url,
        bucket,
        path.trim_start_matches('/')
    )
}

/// アップロード応答の Key（"bucket/path"）からバケット内パスを取り出す
fn stored_path(v: &Value, bucket: &str, fallback: &str) -> String {
    v.get("Key")
        .and_then(Value::as_str)
        .map(|key| {
            key.strip_prefix(bucket)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(key)
                .to_string()
        })
        .unwrap_or_else(|| fallback.to_string())
}

impl ObjectStorage for RestStorage {
    fn upload(&self, upload: Upload<'_>) -> Result<String, Error> {
        let url = object_url(self.client.base_url(), upload.bucket, upload.path);
        let builder = self
            .client
            .request(Method::POST, &url)
            .header("Content-Type", upload.content_type)
            .header("x-upsert", if upload.upsert { "true" } else { "false" })
            .body(upload.bytes.to_vec());
        let v = self.client.send_json(builder)?;
        Ok(stored_path(&v, upload.bucket, upload.path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        public_object_url(self.client.base_url(), bucket, path)
    }
}
