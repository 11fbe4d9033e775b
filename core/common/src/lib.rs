//! journal 共通ライブラリ
//!
//! エラー型・構造化ログ・設定ディレクトリ解決と、ホスト型バックエンド
//! （認証・テーブル・ストレージ）のポートとアダプタを提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（ユーザー ID・セッション・ディレクトリ）
pub mod domain;

/// Outbound ポート
pub mod ports;

/// ポートの実装
pub mod adapter;
