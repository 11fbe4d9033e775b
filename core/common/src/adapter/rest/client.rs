//! ホスト型バックエンドへの共有 HTTP ハンドル
//!
//! プロセス全体で 1 つだけ作り、認証・テーブル・ストレージの各アダプタが共有する。
//! 認証アダプタがセッションを差し替えると、以降のリクエストの Bearer が変わる。

use crate::domain::Session;
use crate::error::Error;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RestClient {
    http: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl RestClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn set_session(&self, session: Option<Session>) {
        if let Ok(mut s) = self.session.write() {
            *s = session;
        }
    }

    /// サインイン中ならアクセストークン、そうでなければ公開キー
    pub fn bearer(&self) -> String {
        self.session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
            .unwrap_or_else(|| self.anon_key.clone())
    }

    /// apikey と Authorization を付けたリクエスト
    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.request_with_bearer(method, url, &self.bearer())
    }

    pub fn request_with_bearer(
        &self,
        method: reqwest::Method,
        url: &str,
        bearer: &str,
    ) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    /// 送信して成功ステータスのレスポンスだけを返す
    pub fn send(&self, builder: RequestBuilder) -> Result<Response, Error> {
        let response = builder
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;
        Err(Error::remote(status.as_u16(), error_message(&body)))
    }

    /// 送信して JSON 本文を返す（空本文は Null）
    pub fn send_json(&self, builder: RequestBuilder) -> Result<Value, Error> {
        let text = self
            .send(builder)?
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// エラー本文からメッセージを取り出す（形式はサービスごとに異なる）
pub fn error_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(s) = v.get(key).and_then(Value::as_str) {
                return s.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        "empty error response".to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthUser, UserId};

    #[test]
    fn test_error_message_variants() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(r#"{"msg":"Token expired"}"#), "Token expired");
        assert_eq!(
            error_message(r#"{"code":"42501","message":"permission denied"}"#),
            "permission denied"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "empty error response");
    }

    #[test]
    fn test_bearer_switches_with_session() {
        let c = RestClient::new("https://x.example.co/", "anon").unwrap();
        assert_eq!(c.base_url(), "https://x.example.co");
        assert_eq!(c.bearer(), "anon");
        c.set_session(Some(Session {
            access_token: "jwt".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 0,
            user: AuthUser {
                id: UserId::new("u1"),
                email: None,
            },
        }));
        assert_eq!(c.bearer(), "jwt");
        c.set_session(None);
        assert_eq!(c.bearer(), "anon");
    }
}
