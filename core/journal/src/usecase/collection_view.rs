//! Filtered Collection View Model（memory 一覧・dream 一覧で共通）
//!
//! サーバーから取った行を丸ごと保持し、キーワードと検索語で表示分だけを導出する。
//! 読み込みは LoadTicket で発行し、最新の発行分かつ画面が生きている場合だけ反映する。

use crate::domain::{derive_available_keywords, Dream, FilterState, Memory, PlaceEntry};
use common::domain::TableName;
use common::error::Error;
use common::ports::outbound::{select_as, Filter, Log, LogLevel, LogRecord, Select, TableProvider};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// memory 一覧: 訪問日の新しい順、同日なら作成の新しい順
pub fn memories_query() -> Select {
    Select::from(TableName::POSTS)
        .order_desc("visited_at")
        .order_desc("created_at")
}

/// dream 一覧: 作成の新しい順
pub fn dreams_query() -> Select {
    Select::from(TableName::DREAMS).order_desc("created_at")
}

/// 画面の 1 回分の表示期間。drop で終わる。
#[derive(Debug)]
pub struct Activation {
    alive: Arc<AtomicBool>,
}

impl Drop for Activation {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// 発行済みの読み込み 1 件
#[derive(Debug, Clone)]
pub struct LoadTicket {
    seq: u64,
    alive: Arc<AtomicBool>,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// 読み込み結果を反映したかどうか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// 失敗。エラーを保持し、前の行はそのまま
    Failed,
    /// 後から発行された読み込みがある
    Superseded,
    /// 発行した画面がもう閉じている
    Inactive,
}

struct ViewState<E> {
    entries: Vec<E>,
    loading: bool,
    error: Option<Error>,
    filter: FilterState,
}

pub struct CollectionView<E> {
    tables: Arc<dyn TableProvider>,
    query: Select,
    log: Arc<dyn Log>,
    state: Mutex<ViewState<E>>,
    latest_seq: AtomicU64,
    /// 現在の表示期間のフラグ（activate 前は常に生きている扱い）
    current: Mutex<Arc<AtomicBool>>,
}

pub type MemoriesView = CollectionView<Memory>;
pub type DreamsView = CollectionView<Dream>;

impl MemoriesView {
    pub fn memories(tables: Arc<dyn TableProvider>, log: Arc<dyn Log>) -> Self {
        Self::new(tables, memories_query(), log)
    }
}

impl DreamsView {
    pub fn dreams(tables: Arc<dyn TableProvider>, log: Arc<dyn Log>) -> Self {
        Self::new(tables, dreams_query(), log)
    }
}

impl<E> CollectionView<E>
where
    E: PlaceEntry + DeserializeOwned + Clone,
{
    pub fn new(tables: Arc<dyn TableProvider>, query: Select, log: Arc<dyn Log>) -> Self {
        Self {
            tables,
            query,
            log,
            state: Mutex::new(ViewState {
                entries: Vec::new(),
                loading: false,
                error: None,
                filter: FilterState::default(),
            }),
            latest_seq: AtomicU64::new(0),
            current: Mutex::new(Arc::new(AtomicBool::new(true))),
        }
    }

    /// 画面にフォーカスが来た。以後の読み込みはこの Activation に結びつく。
    pub fn activate(&self) -> Activation {
        let alive = Arc::new(AtomicBool::new(true));
        if let Ok(mut cur) = self.current.lock() {
            *cur = Arc::clone(&alive);
        }
        Activation { alive }
    }

    /// 読み込みを発行する。読み込み中にしてエラーを消す。
    pub fn begin_load(&self) -> LoadTicket {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let alive = self
            .current
            .lock()
            .map(|a| Arc::clone(&*a))
            .unwrap_or_else(|_| Arc::new(AtomicBool::new(false)));
        if let Ok(mut s) = self.state.lock() {
            s.loading = true;
            s.error = None;
        }
        LoadTicket { seq, alive }
    }

    pub fn fetch(&self) -> Result<Vec<E>, Error> {
        select_as(self.tables.as_ref(), &self.query)
    }

    /// 結果を反映する。古い発行分・閉じた画面の分は黙って捨てる。
    pub fn complete_load(&self, ticket: LoadTicket, result: Result<Vec<E>, Error>) -> LoadOutcome {
        if !ticket.alive.load(Ordering::SeqCst) {
            return LoadOutcome::Inactive;
        }
        if ticket.seq != self.latest_seq.load(Ordering::SeqCst) {
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Debug, "usecase", "remote", "stale load discarded")
                    .field("table", self.query.table.as_str())
                    .field("seq", ticket.seq),
            );
            return LoadOutcome::Superseded;
        }
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(_) => return LoadOutcome::Inactive,
        };
        state.loading = false;
        match result {
            Ok(entries) => {
                state.entries = entries;
                LoadOutcome::Applied
            }
            Err(e) => {
                super::log_remote_failure(
                    self.log.as_ref(),
                    &format!("load {}", self.query.table),
                    &e,
                );
                state.error = Some(e);
                LoadOutcome::Failed
            }
        }
    }

    /// フォーカスのたびに呼ぶ。キャッシュせず毎回取り直す。
    pub fn load(&self) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = self.fetch();
        self.complete_load(ticket, result)
    }

    fn read<R>(&self, f: impl FnOnce(&ViewState<E>) -> R) -> Option<R> {
        self.state.lock().ok().map(|s| f(&s))
    }

    pub fn entries(&self) -> Vec<E> {
        self.read(|s| s.entries.clone()).unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<E> {
        self.read(|s| s.entries.iter().find(|e| e.id() == id).cloned())
            .flatten()
    }

    /// 最新の発行分が完了するまで true
    pub fn is_loading(&self) -> bool {
        self.read(|s| s.loading).unwrap_or(false)
    }

    /// 直近の読み込みの失敗（次の読み込み開始で消える）
    pub fn error(&self) -> Option<Error> {
        self.read(|s| s.error.clone()).flatten()
    }

    pub fn available_keywords(&self) -> Vec<String> {
        self.read(|s| derive_available_keywords(&s.entries))
            .unwrap_or_default()
    }

    /// 現在の絞り込みで表示する行
    pub fn displayed(&self) -> Vec<E> {
        self.read(|s| s.filter.apply(&s.entries).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn filter_state(&self) -> FilterState {
        self.read(|s| s.filter.clone()).unwrap_or_default()
    }

    fn update_filter(&self, f: impl FnOnce(&mut FilterState)) {
        if let Ok(mut s) = self.state.lock() {
            f(&mut s.filter);
        }
    }

    pub fn set_search_query(&self, query: &str) {
        self.update_filter(|f| f.set_search_query(query));
    }

    pub fn toggle_keyword_menu(&self) {
        self.update_filter(FilterState::toggle_keyword_menu);
    }

    pub fn select_keyword(&self, keyword: Option<&str>) {
        self.update_filter(|f| f.select_keyword(keyword));
    }

    /// 手元の行から外す。外したら true。
    pub fn remove_local(&self, id: &str) -> bool {
        match self.state.lock() {
            Ok(mut s) => {
                let before = s.entries.len();
                s.entries.retain(|e| e.id() != id);
                s.entries.len() != before
            }
            Err(_) => false,
        }
    }

    /// 楽観的削除: 先に手元から外し、リモートの削除が失敗しても戻さない
    pub fn delete(&self, id: &str) -> Result<(), Error> {
        self.remove_local(id);
        let result = self
            .tables
            .delete(self.query.table, &[Filter::eq("id", id)]);
        super::logged(self.log.as_ref(), &format!("delete {}", self.query.table), result)
    }
}
