//! アダプター（外界の I/O を trait で実装）
//!
//! usecase は ports::outbound の trait 経由でのみファイル・時刻・環境変数・バックエンドに触れる。
//! 実装は標準実装（Std* / Rest*）かテスト用のメモリ実装を注入する。

pub mod file_json_log;
pub mod file_session_store;
pub mod in_memory_backend;
pub mod rest;
pub mod session_listeners;
pub mod std_clock;
pub mod std_env_resolver;
pub mod std_fs;
pub mod stderr_log;

pub use file_json_log::{FileJsonLog, MemoryLog, NoopLog, TeeLog};
pub use file_session_store::{FileSessionStore, MemorySessionStore};
pub use in_memory_backend::{InMemoryBackend, Op};
pub use rest::{RestAuth, RestClient, RestStorage, RestTables};
pub use session_listeners::ListenerRegistry;
pub use std_clock::{FixedClock, StdClock};
pub use std_env_resolver::{MapEnvResolver, StdEnvResolver};
pub use std_fs::StdFileSystem;
pub use stderr_log::StderrLog;
