//! Ports（Hexagonal）
//!
//! - inbound: CLI がアプリを呼び出す入口
//! - outbound: アプリが外部（画面遷移・場所検索）を使う出口

pub mod inbound;
pub mod outbound;
