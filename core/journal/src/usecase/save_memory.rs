//! memory の保存（作成・編集）と写真の追加
//!
//! 手順ごとに独立した書き込みで、途中で失敗すると書けたところまでが残る。
//! 写真はすべて先に読み込んで縮小・JPEG 化しておき、ローカルの失敗ではリモートに何も書かない。

use crate::domain::photo::prepare_photo;
use crate::domain::{MemoryDraft, Route};
use crate::ports::outbound::Router;
use common::domain::TableName;
use common::error::Error;
use common::ports::outbound::{
    AuthProvider, Clock, FileSystem, Filter, Log, LogLevel, LogRecord, ObjectStorage,
    TableProvider, Upload,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

pub const MSG_NOT_SIGNED_IN: &str = "You are not signed in.";
const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// 写真のストレージ上のパス: {post_id}/{unix_ms}_{index}.jpg
pub fn photo_path(post_id: &str, now_ms: u64, index: usize) -> String {
    format!("{}/{}_{}.jpg", post_id, now_ms, index)
}

pub struct SaveMemoryUseCase {
    auth: Arc<dyn AuthProvider>,
    tables: Arc<dyn TableProvider>,
    storage: Arc<dyn ObjectStorage>,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    router: Arc<dyn Router>,
    log: Arc<dyn Log>,
    bucket: String,
}

impl SaveMemoryUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        tables: Arc<dyn TableProvider>,
        storage: Arc<dyn ObjectStorage>,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        router: Arc<dyn Router>,
        log: Arc<dyn Log>,
        bucket: &str,
    ) -> Self {
        Self {
            auth,
            tables,
            storage,
            fs,
            clock,
            router,
            log,
            bucket: bucket.to_string(),
        }
    }

    /// 保存して memory の id を返す。編集なら詳細画面、作成なら一覧へ置き換える。
    pub fn save(&self, draft: &MemoryDraft, photos: &[PathBuf]) -> Result<String, Error> {
        let payload = draft.validate()?;
        let images = photos
            .iter()
            .map(|p| {
                let bytes = self.fs.read(p)?;
                prepare_photo(&p.display().to_string(), &bytes)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let session = super::logged(self.log.as_ref(), "get session", self.auth.current_session())?
            .ok_or_else(|| Error::session(MSG_NOT_SIGNED_IN))?;
        let author_id = session.user_id().as_str();
        super::logged(
            self.log.as_ref(),
            "upsert profile",
            super::sign_in::upsert_profile(self.tables.as_ref(), &session),
        )?;

        let mut row = serde_json::to_value(&payload)?;
        let saved = match &draft.id {
            Some(id) => self.tables.update(
                TableName::POSTS,
                &[Filter::eq("id", id.as_str()), Filter::eq("author_id", author_id)],
                &row,
            ),
            None => {
                if let Value::Object(map) = &mut row {
                    map.insert("author_id".to_string(), json!(author_id));
                }
                self.tables.insert(TableName::POSTS, &row)
            }
        };
        let saved = super::logged(self.log.as_ref(), "save memory", saved)?;
        let post_id = super::row_id(&saved)?;

        for (index, bytes) in images.iter().enumerate() {
            self.attach_photo(&post_id, index, bytes)?;
        }

        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "usecase", "remote", "memory saved")
                .field("post_id", post_id.as_str())
                .field("edit", draft.is_edit())
                .field("photos", images.len()),
        );
        self.router.replace(if draft.is_edit() {
            Route::post(&post_id)
        } else {
            Route::my_posts()
        });
        Ok(post_id)
    }

    /// 1 枚アップロードして media に登録。最初の 1 枚は表紙にする。
    fn attach_photo(&self, post_id: &str, index: usize, bytes: &[u8]) -> Result<(), Error> {
        let path = photo_path(post_id, self.clock.now_ms(), index);
        let stored = super::logged(
            self.log.as_ref(),
            "upload photo",
            self.storage.upload(Upload {
                bucket: &self.bucket,
                path: &path,
                bytes,
                content_type: PHOTO_CONTENT_TYPE,
                upsert: false,
            }),
        )?;
        super::logged(
            self.log.as_ref(),
            "insert media",
            self.tables
                .insert(TableName::MEDIA, &json!({ "post_id": post_id, "url": stored })),
        )?;
        if index == 0 {
            super::logged(
                self.log.as_ref(),
                "update cover",
                self.tables.update(
                    TableName::POSTS,
                    &[Filter::eq("id", post_id)],
                    &json!({ "cover_url": stored }),
                ),
            )?;
        }
        Ok(())
    }
}
