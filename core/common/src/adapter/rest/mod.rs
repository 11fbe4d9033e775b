//! ホスト型バックエンド（REST）のアダプタ群
//!
//! 1 つの RestClient を認証・テーブル・ストレージで共有する。

pub mod auth;
pub mod client;
pub mod storage;
pub mod tables;

pub use auth::RestAuth;
pub use client::RestClient;
pub use storage::RestStorage;
pub use tables::RestTables;
