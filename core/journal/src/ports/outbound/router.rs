//! 画面遷移 Outbound ポート

use crate::domain::Route;

/// ルーター抽象
///
/// 実装は `crate::adapter::HistoryRouter`（遷移履歴をメモリに持つ）。
pub trait Router: Send + Sync {
    /// 現在の画面を置き換える
    fn replace(&self, route: Route);
    fn push(&self, route: Route);
    /// 1 つ前に戻る（先頭なら何もしない）
    fn back(&self);
    fn current_path(&self) -> String;
}
