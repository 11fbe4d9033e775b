//! セッション永続化 Outbound ポート
//!
//! 起動をまたいでセッションを保持する。実装は FileSessionStore（session.json）など。

use crate::domain::Session;
use crate::error::Error;

pub trait SessionStore: Send + Sync {
    /// 保存済みのセッション（なければ Ok(None)）
    fn load(&self) -> Result<Option<Session>, Error>;
    fn save(&self, session: &Session) -> Result<(), Error>;
    /// 保存済みのセッションを消す（なくてもエラーにしない）
    fn clear(&self) -> Result<(), Error>;
}
