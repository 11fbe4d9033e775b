//! ユースケースをまたぐシナリオテスト（メモリ上のバックエンドで実行）

mod collection_tests;
mod save_memory_tests;

use crate::domain::{AllowList, AppConfig};
use crate::wiring::{App, Backend};
use common::adapter::{FixedClock, InMemoryBackend, MemoryLog, StdFileSystem};
use std::sync::Arc;

/// 2024-06-01T00:00:00Z
pub(crate) const NOW_MS: u64 = 1_717_200_000_000;

/// メモリ上のバックエンドにつないだ App
pub(crate) fn memory_app(backend: &Arc<InMemoryBackend>, allowed: &str) -> (App, Arc<MemoryLog>) {
    let log = Arc::new(MemoryLog::new());
    let app = App {
        config: Arc::new(AppConfig {
            allow_list: AllowList::parse(allowed),
            photo_bucket: "photos".to_string(),
            ..Default::default()
        }),
        fs: Arc::new(StdFileSystem),
        clock: Arc::new(FixedClock(NOW_MS)),
        logger: log.clone(),
        backend: Some(Backend {
            auth: backend.clone(),
            tables: backend.clone(),
            storage: backend.clone(),
        }),
        place_search: None,
    };
    (app, log)
}
