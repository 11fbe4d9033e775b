//! 環境変数解決 Outbound ポート
//!
//! usecase / wiring はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::Dirs;
use crate::error::Error;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のマップ実装など。
pub trait EnvResolver: Send + Sync {
    /// 空文字は未設定として扱う
    fn var(&self, name: &str) -> Option<String>;

    /// ホームディレクトリを解決する
    ///
    /// 優先順位:
    /// 1. JOURNAL_HOME（設定されていれば）
    /// 2. $XDG_CONFIG_HOME/journal
    /// 3. $HOME/.config/journal
    fn resolve_dirs(&self) -> Result<Dirs, Error>;
}
