//! 認証セッション
//!
//! セッションの生成・更新・破棄は認証プロバイダの責務。アプリ側は観測するだけ。

use super::UserId;
use serde::{Deserialize, Serialize};

/// サインイン中のユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// 認証プロバイダが発行した資格情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// 失効時刻（Unix 秒）
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// `now` から `margin_secs` 以内に失効するか
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at - now <= margin_secs
    }

    /// profiles.display_name に使う表示名
    pub fn display_name(&self) -> &str {
        self.user.email.as_deref().unwrap_or("user")
    }
}

/// セッション変化の通知種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}
