//! dream の追加と、dream から memory への昇格

use crate::domain::draft::{draft_from_candidate, iso_date_from_secs, promote_to_draft};
use crate::domain::route::ADD;
use crate::domain::{Dream, DreamPayload, MemoryDraft, PlaceCandidate, Route};
use crate::ports::outbound::Router;
use common::domain::TableName;
use common::error::Error;
use common::ports::outbound::{AuthProvider, Clock, Log, LogLevel, LogRecord, TableProvider};
use std::sync::Arc;

pub struct DreamsUseCase {
    auth: Arc<dyn AuthProvider>,
    tables: Arc<dyn TableProvider>,
    clock: Arc<dyn Clock>,
    router: Arc<dyn Router>,
    log: Arc<dyn Log>,
}

impl DreamsUseCase {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        tables: Arc<dyn TableProvider>,
        clock: Arc<dyn Clock>,
        router: Arc<dyn Router>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            auth,
            tables,
            clock,
            router,
            log,
        }
    }

    /// 検索結果を dream として保存する
    pub fn add_from_candidate(
        &self,
        candidate: &PlaceCandidate,
        keyword: Option<&str>,
    ) -> Result<Dream, Error> {
        let session = super::logged(self.log.as_ref(), "get session", self.auth.current_session())?
            .ok_or_else(|| Error::session(super::save_memory::MSG_NOT_SIGNED_IN))?;
        super::logged(
            self.log.as_ref(),
            "upsert profile",
            super::sign_in::upsert_profile(self.tables.as_ref(), &session),
        )?;
        let payload = DreamPayload::from_candidate(session.user_id().as_str(), candidate, keyword);
        let row = super::logged(
            self.log.as_ref(),
            "insert dream",
            self.tables
                .insert(TableName::DREAMS, &serde_json::to_value(&payload)?),
        )?;
        let dream: Dream = serde_json::from_value(row)?;
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "usecase", "remote", "dream added")
                .field("dream_id", dream.id.as_str()),
        );
        Ok(dream)
    }

    fn open_draft(&self, draft: MemoryDraft) -> MemoryDraft {
        self.router
            .push(Route::to(ADD).with_params(draft.to_route_params()));
        draft
    }

    fn today(&self) -> String {
        iso_date_from_secs(self.clock.now_secs())
    }

    /// dream を新しい memory の下書きにして入力画面を開く
    pub fn promote(&self, dream: &Dream) -> MemoryDraft {
        self.open_draft(promote_to_draft(dream, &self.today()))
    }

    /// 検索結果をそのまま memory の下書きにして入力画面を開く
    pub fn draft_candidate(&self, candidate: &PlaceCandidate, keyword: Option<&str>) -> MemoryDraft {
        self.open_draft(draft_from_candidate(candidate, keyword, &self.today()))
    }
}
