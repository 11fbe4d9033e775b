//! Outbound ポート: アプリが外界（FS・時刻・環境変数・ログ・認証・テーブル・ストレージ）を使うための trait

pub mod auth_provider;
pub mod clock;
pub mod env_resolver;
pub mod fs;
pub mod log;
pub mod object_storage;
pub mod session_store;
pub mod table_provider;

pub use auth_provider::{AuthProvider, SessionListener, Subscription};
pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::FileSystem;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
pub use object_storage::{ObjectStorage, Upload};
pub use session_store::SessionStore;
pub use table_provider::{select_as, select_single, Filter, Order, Select, TableProvider};
