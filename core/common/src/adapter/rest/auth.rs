//! 認証 API（/auth/v1）を使う AuthProvider 実装
//!
//! セッションは SessionStore に永続化し、失効間近なら refresh_token で更新する。

use super::client::RestClient;
use crate::adapter::ListenerRegistry;
use crate::domain::{AuthUser, Session, SessionEvent, UserId};
use crate::error::Error;
use crate::ports::outbound::{
    AuthProvider, Clock, Log, LogLevel, LogRecord, SessionListener, SessionStore, Subscription,
};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

/// この秒数以内に失効するセッションは使う前に更新する
const REFRESH_MARGIN_SECS: i64 = 60;

pub struct RestAuth {
    client: Arc<RestClient>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
    listeners: ListenerRegistry,
}

impl RestAuth {
    pub fn new(
        client: Arc<RestClient>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            client,
            store,
            clock,
            log,
            listeners: ListenerRegistry::new(),
        }
    }

    fn token_url(&self, grant_type: &str) -> String {
        self.client
            .url(&format!("/auth/v1/token?grant_type={}", grant_type))
    }

    fn request_token(&self, grant_type: &str, body: Value) -> Result<Session, Error> {
        // ユーザートークンはまだないので公開キーで送る
        let builder = self
            .client
            .request_with_bearer(Method::POST, &self.token_url(grant_type), self.client.anon_key())
            .json(&body);
        let v = self.client.send_json(builder)?;
        parse_token_response(&v, self.clock.now_secs())
    }

    fn adopt(&self, session: Option<&Session>, event: SessionEvent) -> Result<(), Error> {
        match session {
            Some(s) => self.store.save(s)?,
            None => self.store.clear()?,
        }
        self.client.set_session(session.cloned());
        self.listeners.notify(event, session);
        Ok(())
    }

    fn refresh(&self, stale: &Session) -> Result<Option<Session>, Error> {
        match self.request_token(
            "refresh_token",
            json!({ "refresh_token": stale.refresh_token }),
        ) {
            Ok(fresh) => {
                self.adopt(Some(&fresh), SessionEvent::TokenRefreshed)?;
                Ok(Some(fresh))
            }
            Err(e) => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Warn, "adapter", "session", "token refresh failed")
                        .field("error", e.to_string()),
                );
                self.adopt(None, SessionEvent::SignedOut)?;
                Ok(None)
            }
        }
    }
}

/// トークン応答を Session に変換する（expires_at がなければ now + expires_in）
pub fn parse_token_response(v: &Value, now: i64) -> Result<Session, Error> {
    let str_field = |key: &str| -> Result<String, Error> {
        v.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::json(format!("token response has no '{}'", key)))
    };
    let expires_at = v
        .get("expires_at")
        .and_then(Value::as_i64)
        .or_else(|| v.get("expires_in").and_then(Value::as_i64).map(|s| now + s))
        .ok_or_else(|| Error::json("token response has no expiry"))?;
    let user = v
        .get("user")
        .ok_or_else(|| Error::json("token response has no 'user'"))?;
    let id = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::json("token response has no user id"))?;
    Ok(Session {
        access_token: str_field("access_token")?,
        refresh_token: str_field("refresh_token")?,
        expires_at,
        user: AuthUser {
            id: UserId::new(id),
            email: user.get("email").and_then(Value::as_str).map(str::to_string),
        },
    })
}

impl AuthProvider for RestAuth {
    fn current_session(&self) -> Result<Option<Session>, Error> {
        let Some(stored) = self.store.load()? else {
            self.client.set_session(None);
            return Ok(None);
        };
        if stored.expires_within(self.clock.now_secs(), REFRESH_MARGIN_SECS) {
            return self.refresh(&stored);
        }
        self.client.set_session(Some(stored.clone()));
        Ok(Some(stored))
    }

    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let session = self
            .request_token("password", json!({ "email": email, "password": password }))
            .map_err(|e| match e {
                Error::Remote { status, message } if (400..500).contains(&status) => {
                    Error::session(message)
                }
                other => other,
            })?;
        self.adopt(Some(&session), SessionEvent::SignedIn)?;
        Ok(session)
    }

    fn sign_out(&self) -> Result<(), Error> {
        if let Some(session) = self.store.load().ok().flatten() {
            let builder = self.client.request_with_bearer(
                Method::POST,
                &self.client.url("/auth/v1/logout"),
                &session.access_token,
            );
            if let Err(e) = self.client.send(builder) {
                // ローカルのセッションは必ず消す
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Warn, "adapter", "session", "remote logout failed")
                        .field("error", e.to_string()),
                );
            }
        }
        self.adopt(None, SessionEvent::SignedOut)
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}
