//! 実行時ディレクトリ（JOURNAL_HOME / XDG 解決結果）
//!
//! EnvResolver::resolve_dirs() で取得し、設定・セッション・ログのパス計算に使う。

use std::path::PathBuf;

/// 解決済みの home / state ディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub home_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl Dirs {
    /// home 直下に state を置くレイアウトで組み立てる
    pub fn from_home(home_dir: impl Into<PathBuf>) -> Self {
        let home_dir = home_dir.into();
        let state_dir = home_dir.join("state");
        Self { home_dir, state_dir }
    }

    /// 任意の設定ファイル（config.json）
    pub fn config_file(&self) -> PathBuf {
        self.home_dir.join("config.json")
    }

    /// 永続化したセッション（サインイン中のみ存在）
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    /// JSONL ログ
    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("journal.log")
    }
}
