//! エラーハンドリング
//!
//! 全レイヤー共通のエラー型。CLI では `exit_code()` をそのまま終了コードに使う。

use thiserror::Error as ThisError;

/// エラーの大分類（ユーザーへの見せ方・副作用の判断に使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// セッションなし・期限切れ・サインイン拒否
    Session,
    /// セッションはあるが許可リスト外
    Authorization,
    /// 通信失敗・バックエンドが返したエラー
    Remote,
    /// リモート呼び出し前の入力チェック失敗
    Validation,
    /// ローカル I/O・設定・その他
    Local,
}

/// エラー型
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    /// 入力値の検証エラー
    #[error("{0}")]
    Validation(String),
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("{0}")]
    Session(String),
    #[error("{0}")]
    Forbidden(String),
    /// 通信そのものの失敗
    #[error("{0}")]
    Http(String),
    /// バックエンドがエラー応答を返した
    #[error("{message} (HTTP {status})")]
    Remote { status: u16, message: String },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Io(String),
    /// 設定（環境変数・config.json）の不足・不正
    #[error("{0}")]
    Env(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// usage を併せて表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Session(_) => ErrorClass::Session,
            Self::Forbidden(_) => ErrorClass::Authorization,
            Self::Http(_) | Self::Remote { .. } | Self::NotFound(_) => ErrorClass::Remote,
            Self::Validation(_) | Self::InvalidArgument(_) => ErrorClass::Validation,
            Self::Json(_) | Self::Io(_) | Self::Env(_) | Self::System(_) => ErrorClass::Local,
        }
    }

    /// sysexits.h に合わせた終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Validation(_) | Self::Json(_) => 65,
            Self::NotFound(_) => 66,
            Self::Remote { .. } => 69,
            Self::System(_) => 70,
            Self::Http(_) | Self::Io(_) => 74,
            Self::Session(_) | Self::Forbidden(_) => 77,
            Self::Env(_) => 78,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
