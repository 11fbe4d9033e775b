//! Access Gate: 保護画面に入れるかどうかの唯一の判定者
//!
//! 起動時は Unresolved。現在のセッションを 1 回だけ解決し、以後はセッション変化の
//! 通知を購読して判定し直す。解決に失敗したら未認証として扱う（fail closed）。

use crate::domain::{AccessState, AllowList, RouteDecision};
use crate::ports::outbound::Router;
use common::domain::{Session, SessionEvent};
use common::ports::outbound::{AuthProvider, Log, LogLevel, LogRecord, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// 状態を書き換えて遷移を記録する（購読コールバックと resolve で共有）
struct GateState {
    state: Mutex<AccessState>,
    allow_list: AllowList,
    log: Arc<dyn Log>,
}

impl GateState {
    fn evaluate(&self, session: Option<&Session>, cause: &str) -> AccessState {
        let next = AccessState::evaluate(session, &self.allow_list);
        let prev = match self.state.lock() {
            Ok(mut s) => std::mem::replace(&mut *s, next.clone()),
            Err(_) => return next,
        };
        if prev != next {
            let mut rec = LogRecord::new(LogLevel::Info, "usecase", "access", "access state changed")
                .field("from", prev.label())
                .field("to", next.label())
                .field("allowed", next.is_allowed())
                .field("cause", cause);
            if let AccessState::Denied(uid) | AccessState::Allowed(uid) = &next {
                rec = rec.field("user_id", uid.as_str());
            }
            let _ = self.log.log(&rec);
        }
        next
    }

    fn current(&self) -> AccessState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(AccessState::Unauthenticated)
    }
}

pub struct AccessGate {
    auth: Arc<dyn AuthProvider>,
    inner: Arc<GateState>,
    /// teardown 後に届いた通知を無視するためのフラグ
    alive: Arc<AtomicBool>,
    subscription: Mutex<Option<Subscription>>,
}

impl AccessGate {
    pub fn new(auth: Arc<dyn AuthProvider>, allow_list: AllowList, log: Arc<dyn Log>) -> Self {
        Self {
            auth,
            inner: Arc::new(GateState {
                state: Mutex::new(AccessState::Unresolved),
                allow_list,
                log,
            }),
            alive: Arc::new(AtomicBool::new(true)),
            subscription: Mutex::new(None),
        }
    }

    /// 通知を購読してから現在のセッションを解決する
    pub fn mount(&self) -> AccessState {
        self.subscribe();
        self.resolve()
    }

    fn subscribe(&self) {
        let inner = Arc::clone(&self.inner);
        let alive = Arc::clone(&self.alive);
        let sub = self
            .auth
            .subscribe(Arc::new(move |event: SessionEvent, session: Option<&Session>| {
                if alive.load(Ordering::SeqCst) {
                    inner.evaluate(session, &format!("{:?}", event));
                }
            }));
        if let Ok(mut slot) = self.subscription.lock() {
            // 二重に mount したら古い購読は drop で解放される
            *slot = Some(sub);
        }
    }

    /// 現在のセッションを 1 回だけ問い合わせる。エラーは未認証扱い。
    pub fn resolve(&self) -> AccessState {
        match self.auth.current_session() {
            Ok(session) => self.inner.evaluate(session.as_ref(), "resolve"),
            Err(e) => {
                let _ = self.inner.log.log(
                    &LogRecord::new(LogLevel::Warn, "usecase", "access", "session lookup failed")
                        .field("error", e.to_string()),
                );
                self.inner.evaluate(None, "resolve-error")
            }
        }
    }

    pub fn state(&self) -> AccessState {
        self.inner.current()
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.inner.allow_list
    }

    /// 現在のパスに対する判定（副作用なし）
    pub fn decide(&self, current_path: &str) -> RouteDecision {
        self.state().decide(current_path)
    }

    /// 判定を適用する。許可リスト外のセッションは失効させ、必要ならサインイン画面へ置き換える。
    pub fn guard(&self, router: &dyn Router) -> RouteDecision {
        let state = self.state();
        if let AccessState::Denied(uid) = &state {
            let _ = self.inner.log.log(
                &LogRecord::new(LogLevel::Warn, "usecase", "access", "signing out user outside allow list")
                    .field("user_id", uid.as_str()),
            );
            if let Err(e) = self.auth.sign_out() {
                super::log_remote_failure(self.inner.log.as_ref(), "sign out", &e);
            }
        }
        let decision = state.decide(&router.current_path());
        if let RouteDecision::Redirect(route) = &decision {
            router.replace(route.clone());
        }
        decision
    }

    /// 購読を解放する。以後の通知は状態に反映しない。
    pub fn teardown(&self) {
        self.alive.store(false, Ordering::SeqCst);
        let sub = self.subscription.lock().ok().and_then(|mut s| s.take());
        if let Some(sub) = sub {
            sub.unsubscribe();
        }
    }
}

impl Drop for AccessGate {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::HistoryRouter;
    use crate::domain::Route;
    use common::adapter::{InMemoryBackend, MemoryLog, Op};
    use common::domain::UserId;

    fn gate(backend: &Arc<InMemoryBackend>, allowed: &str) -> (AccessGate, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::new());
        let auth: Arc<dyn AuthProvider> = backend.clone();
        (AccessGate::new(auth, AllowList::parse(allowed), log.clone()), log)
    }

    #[test]
    fn test_starts_unresolved_and_decides_nothing() {
        let backend = Arc::new(InMemoryBackend::new());
        let (gate, _) = gate(&backend, "u1");
        assert_eq!(gate.state(), AccessState::Unresolved);
        let router = HistoryRouter::new(Route::dreams());
        assert_eq!(gate.guard(&router), RouteDecision::Loading);
        assert_eq!(router.current_path(), "/dreams");
    }

    #[test]
    fn test_lookup_error_fails_closed() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_session_for(Some("u1"));
        backend.fail(None, Op::CurrentSession);
        let (gate, log) = gate(&backend, "u1");
        assert_eq!(gate.mount(), AccessState::Unauthenticated);
        assert!(log
            .messages_of_kind("access")
            .contains(&"session lookup failed".to_string()));
    }

    #[test]
    fn test_notifications_reevaluate_until_teardown() {
        let backend = Arc::new(InMemoryBackend::new());
        let (gate, _) = gate(&backend, "u1");
        assert_eq!(gate.mount(), AccessState::Unauthenticated);
        assert_eq!(backend.listener_count(), 1);

        backend.emit_session_change(Some("u1"));
        assert_eq!(gate.state(), AccessState::Allowed(UserId::new("u1")));
        backend.emit_session_change(Some("u3"));
        assert_eq!(gate.state(), AccessState::Denied(UserId::new("u3")));
        backend.emit_session_change(None);
        assert_eq!(gate.state(), AccessState::Unauthenticated);

        gate.teardown();
        assert_eq!(backend.listener_count(), 0);
        backend.emit_session_change(Some("u1"));
        assert_eq!(gate.state(), AccessState::Unauthenticated);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let backend = Arc::new(InMemoryBackend::new());
        {
            let (gate, _) = gate(&backend, "u1");
            gate.mount();
            assert_eq!(backend.listener_count(), 1);
        }
        assert_eq!(backend.listener_count(), 0);
    }

    #[test]
    fn test_allowed_user_proceeds_anywhere() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_session_for(Some("u1"));
        let (gate, _) = gate(&backend, "u1,u2");
        gate.mount();
        let router = HistoryRouter::new(Route::post("p1"));
        assert_eq!(gate.guard(&router), RouteDecision::Proceed);
        assert_eq!(router.current_path(), "/post/p1");
        assert_eq!(backend.sign_out_calls(), 0);
    }

    #[test]
    fn test_unauthenticated_on_public_screen_is_not_redirected() {
        let backend = Arc::new(InMemoryBackend::new());
        let (gate, _) = gate(&backend, "u1");
        gate.mount();
        let router = HistoryRouter::new(Route::sign_in());
        assert_eq!(gate.guard(&router), RouteDecision::Proceed);
        assert_eq!(router.history().len(), 1);
    }
}
