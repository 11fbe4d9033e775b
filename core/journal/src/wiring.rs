//! 配線: 標準アダプタで App を組み立てる

use std::sync::Arc;

use common::adapter::{
    FileJsonLog, FileSessionStore, RestAuth, RestClient, RestStorage, RestTables, StderrLog,
    StdClock, StdEnvResolver, StdFileSystem, TeeLog,
};
use common::error::Error;
use common::ports::outbound::{
    AuthProvider, Clock, EnvResolver, FileSystem, Log, ObjectStorage, TableProvider,
};

use crate::adapter::{load_app_config, GooglePlacesSearch};
use crate::domain::AppConfig;
use crate::ports::outbound::PlaceSearch;

/// ホスト型バックエンドの 3 ポート
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub tables: Arc<dyn TableProvider>,
    pub storage: Arc<dyn ObjectStorage>,
}

/// main が使う依存の束。設定は起動時に 1 度だけ作り、以後は読むだけ。
pub struct App {
    pub config: Arc<AppConfig>,
    pub fs: Arc<dyn FileSystem>,
    pub clock: Arc<dyn Clock>,
    pub logger: Arc<dyn Log>,
    /// 接続先が未設定なら None（リモートを使うコマンドだけが失敗する）
    pub backend: Option<Backend>,
    pub place_search: Option<Arc<dyn PlaceSearch>>,
}

impl App {
    pub fn backend(&self) -> Result<&Backend, Error> {
        match &self.backend {
            Some(b) => Ok(b),
            None => Err(self
                .config
                .backend()
                .err()
                .unwrap_or_else(|| Error::env("backend is not configured"))),
        }
    }

    pub fn place_search(&self) -> Result<&dyn PlaceSearch, Error> {
        match &self.place_search {
            Some(s) => Ok(s.as_ref()),
            None => Err(self
                .config
                .maps_api_key()
                .err()
                .unwrap_or_else(|| Error::env("place search is not configured"))),
        }
    }
}

/// 配線: 標準アダプタで App を組み立てる
pub fn wire_journal(verbose: bool) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env = StdEnvResolver;
    let dirs = env.resolve_dirs()?;

    let file_log: Arc<dyn Log> = Arc::new(FileJsonLog::new(Arc::clone(&fs), dirs.log_file()));
    let logger: Arc<dyn Log> = if verbose {
        Arc::new(TeeLog::new(vec![file_log, Arc::new(StderrLog)]))
    } else {
        file_log
    };

    let config = Arc::new(load_app_config(fs.as_ref(), &env, &dirs)?);
    let clock: Arc<dyn Clock> = Arc::new(StdClock);

    let backend = match config.backend() {
        Ok(endpoint) => {
            let client = Arc::new(RestClient::new(&endpoint.url, &endpoint.anon_key)?);
            let store = Arc::new(FileSessionStore::new(Arc::clone(&fs), dirs.session_file()));
            Some(Backend {
                auth: Arc::new(RestAuth::new(
                    Arc::clone(&client),
                    store,
                    Arc::clone(&clock),
                    Arc::clone(&logger),
                )),
                tables: Arc::new(RestTables::new(Arc::clone(&client))),
                storage: Arc::new(RestStorage::new(client)),
            })
        }
        Err(_) => None,
    };

    let place_search: Option<Arc<dyn PlaceSearch>> = match config.maps_api_key() {
        Ok(key) => Some(Arc::new(GooglePlacesSearch::new(key)?)),
        Err(_) => None,
    };

    Ok(App {
        config,
        fs,
        clock,
        logger,
        backend,
        place_search,
    })
}
