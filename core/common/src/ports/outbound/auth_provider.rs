//! 認証・セッション Outbound ポート
//!
//! セッションの取得・サインイン・サインアウトと、セッション変化の購読を提供する。

use crate::domain::{Session, SessionEvent};
use crate::error::Error;
use std::sync::Arc;

/// セッション変化の通知先（新しいセッション、サインアウト時は None）
pub type SessionListener = Arc<dyn Fn(SessionEvent, Option<&Session>) + Send + Sync>;

/// 購読ハンドル。`unsubscribe()` か drop で購読を解除する。
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// 認証プロバイダ（Outbound ポート）
///
/// 実装は `common::adapter::RestAuth`（ホスト型バックエンド）や `InMemoryBackend`（テスト用）。
pub trait AuthProvider: Send + Sync {
    /// 現在のセッション。必要ならトークンを更新してから返す。
    fn current_session(&self) -> Result<Option<Session>, Error>;

    /// メールアドレスとパスワードでサインインする
    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error>;

    /// サインアウト（セッションを失効させる）
    fn sign_out(&self) -> Result<(), Error>;

    /// セッション変化を購読する
    fn subscribe(&self, listener: SessionListener) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscription_releases_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_releases_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let c = Arc::clone(&count);
            let _sub = Subscription::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
