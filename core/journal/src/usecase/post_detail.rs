//! memory の詳細（写真・表紙・地図リンク）と編集画面への遷移

use crate::domain::draft::{edit_draft, iso_date_from_secs};
use crate::domain::route::ADD;
use crate::domain::{Coordinate, MediaItem, Memory, MemoryDraft, PlaceEntry, Route};
use crate::ports::outbound::Router;
use common::domain::TableName;
use common::error::Error;
use common::ports::outbound::{
    select_as, select_single, Clock, Log, ObjectStorage, Select, TableProvider,
};
use std::sync::Arc;

pub const MSG_NOT_FOUND: &str = "This memory could not be found.";

const DETAIL_COLUMNS: &str =
    "id, title, place_name, address, visited_at, body, lat, lng, cover_url, keyword, author_id";

/// 外部の地図アプリで開くリンク
pub fn maps_link(c: Coordinate) -> String {
    format!("https://www.google.com/maps/search/?api=1&query={},{}", c.lat, c.lng)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDetail {
    pub memory: Memory,
    pub cover_url: Option<String>,
    /// 表紙以外の写真
    pub photos: Vec<Photo>,
    pub maps_link: Option<String>,
}

pub struct PostDetailUseCase {
    tables: Arc<dyn TableProvider>,
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn Clock>,
    router: Arc<dyn Router>,
    log: Arc<dyn Log>,
    bucket: String,
}

impl PostDetailUseCase {
    pub fn new(
        tables: Arc<dyn TableProvider>,
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
        router: Arc<dyn Router>,
        log: Arc<dyn Log>,
        bucket: &str,
    ) -> Self {
        Self {
            tables,
            storage,
            clock,
            router,
            log,
            bucket: bucket.to_string(),
        }
    }

    fn fetch(&self, id: &str) -> Result<(Memory, Vec<MediaItem>), Error> {
        let memory: Memory = select_single(
            self.tables.as_ref(),
            &Select::from(TableName::POSTS).columns(DETAIL_COLUMNS).eq("id", id),
        )?;
        let media: Vec<MediaItem> = select_as(
            self.tables.as_ref(),
            &Select::from(TableName::MEDIA).columns("id, url").eq("post_id", id),
        )?;
        Ok((memory, media))
    }

    /// 取得に失敗したら前の画面へ戻る
    pub fn load(&self, id: &str) -> Result<MemoryDetail, Error> {
        let (memory, media) = match self.fetch(id) {
            Ok(v) => v,
            Err(e) => {
                super::log_remote_failure(self.log.as_ref(), "load memory", &e);
                self.router.back();
                return Err(Error::not_found(MSG_NOT_FOUND));
            }
        };
        let cover_url = memory
            .cover_url
            .as_deref()
            .map(|p| self.storage.public_url(&self.bucket, p));
        let photos = media
            .into_iter()
            .filter(|m| memory.cover_url.as_deref() != Some(m.url.as_str()))
            .map(|m| Photo {
                url: self.storage.public_url(&self.bucket, &m.url),
                id: m.id,
                path: m.url,
            })
            .collect();
        let maps_link = memory.coordinate().map(maps_link);
        Ok(MemoryDetail {
            memory,
            cover_url,
            photos,
            maps_link,
        })
    }

    /// 編集画面を開く
    pub fn open_edit(&self, memory: &Memory) -> MemoryDraft {
        let draft = edit_draft(memory, &iso_date_from_secs(self.clock.now_secs()));
        self.router
            .push(Route::to(ADD).with_params(draft.to_route_params()));
        draft
    }
}
