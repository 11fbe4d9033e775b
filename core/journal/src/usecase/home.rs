//! ホーム画面: 最近の memory、件数、地図ピン、キーワード候補、場所検索
//!
//! 各部分は独立して取得し、1 つが失敗しても残りは表示する。

use crate::domain::{merge_keyword_suggestions, Coordinate, Dream, Memory, PlaceCandidate, PlaceEntry};
use crate::ports::outbound::PlaceSearch;
use common::domain::TableName;
use common::error::Error;
use common::ports::outbound::{select_as, Log, LogLevel, LogRecord, Select, TableProvider};
use serde_json::Value;
use std::sync::Arc;

pub const RECENT_LIMIT: usize = 10;
pub const MSG_EMPTY_SEARCH: &str = "Enter a place to search for.";

const RECENT_COLUMNS: &str = "id, title, place_name, address, visited_at, cover_url, keyword";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    Memory,
    Dream,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPin {
    pub kind: PinKind,
    pub id: String,
    pub label: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeSummary {
    pub recent: Vec<Memory>,
    /// 取得に失敗した件数は None
    pub memory_count: Option<u64>,
    pub dream_count: Option<u64>,
    pub pins: Vec<MapPin>,
    pub keyword_suggestions: Vec<String>,
}

pub struct HomeUseCase {
    tables: Arc<dyn TableProvider>,
    log: Arc<dyn Log>,
}

impl HomeUseCase {
    pub fn new(tables: Arc<dyn TableProvider>, log: Arc<dyn Log>) -> Self {
        Self { tables, log }
    }

    fn soft<T>(&self, step: &str, result: Result<T, Error>) -> Option<T> {
        super::logged(self.log.as_ref(), step, result).ok()
    }

    pub fn recent_memories(&self) -> Result<Vec<Memory>, Error> {
        select_as(
            self.tables.as_ref(),
            &Select::from(TableName::POSTS)
                .columns(RECENT_COLUMNS)
                .order_desc("visited_at")
                .order_desc("created_at")
                .limit(RECENT_LIMIT),
        )
    }

    /// 緯度・経度の両方がある行だけをピンにする
    pub fn map_pins(&self) -> Vec<MapPin> {
        let memories: Vec<Memory> = self
            .soft(
                "load memory pins",
                select_as(
                    self.tables.as_ref(),
                    &Select::from(TableName::POSTS)
                        .columns("id, title, place_name, lat, lng")
                        .not_null("lat")
                        .not_null("lng"),
                ),
            )
            .unwrap_or_default();
        let dreams: Vec<Dream> = self
            .soft(
                "load dream pins",
                select_as(
                    self.tables.as_ref(),
                    &Select::from(TableName::DREAMS)
                        .columns("id, place_name, lat, lng")
                        .not_null("lat")
                        .not_null("lng"),
                ),
            )
            .unwrap_or_default();

        let memory_pins = memories.iter().filter_map(|m| {
            Some(MapPin {
                kind: PinKind::Memory,
                id: m.id.clone(),
                label: (if m.title.is_empty() { m.name() } else { m.title.as_str() }).to_string(),
                coordinate: m.coordinate()?,
            })
        });
        let dream_pins = dreams.iter().filter_map(|d| {
            Some(MapPin {
                kind: PinKind::Dream,
                id: d.id.clone(),
                label: d.place_name.clone(),
                coordinate: d.coordinate()?,
            })
        });
        memory_pins.chain(dream_pins).collect()
    }

    fn keywords_of(&self, table: TableName) -> Option<Vec<Value>> {
        self.soft(
            &format!("load {} keywords", table),
            self.tables
                .select(&Select::from(table).columns("keyword").not_null("keyword")),
        )
    }

    /// memory と dream のキーワードを合わせた候補。失敗したテーブルは飛ばす。
    pub fn keyword_suggestions(&self) -> Vec<String> {
        let rows: Vec<Value> = [TableName::POSTS, TableName::DREAMS]
            .into_iter()
            .filter_map(|t| self.keywords_of(t))
            .flatten()
            .collect();
        merge_keyword_suggestions(rows.iter().map(|r| r.get("keyword").and_then(Value::as_str)))
    }

    pub fn summary(&self) -> HomeSummary {
        HomeSummary {
            recent: self
                .soft("load recent memories", self.recent_memories())
                .unwrap_or_default(),
            memory_count: self.soft("count memories", self.tables.count(TableName::POSTS, &[])),
            dream_count: self.soft("count dreams", self.tables.count(TableName::DREAMS, &[])),
            pins: self.map_pins(),
            keyword_suggestions: self.keyword_suggestions(),
        }
    }
}

/// 場所をテキストで探す。空の検索語はリモートに送らない。
pub fn search_places(
    search: &dyn PlaceSearch,
    log: &dyn Log,
    query: &str,
    around: Coordinate,
) -> Result<Vec<PlaceCandidate>, Error> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::validation(MSG_EMPTY_SEARCH));
    }
    let results = super::logged(log, "search places", search.search(query, around))?;
    let _ = log.log(
        &LogRecord::new(LogLevel::Debug, "usecase", "remote", "place search finished")
            .field("query", query)
            .field("results", results.len()),
    );
    Ok(results)
}
