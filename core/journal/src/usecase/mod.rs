//! ユースケース層（ports 経由でバックエンド・ルーターを使う）

pub mod access_gate;
pub mod collection_view;
pub mod dreams;
pub mod home;
pub mod post_detail;
pub mod save_memory;
pub mod sign_in;

use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use serde_json::Value;

/// 呼び出し箇所で捕まえたリモート失敗を記録する（再試行はしない）
pub(crate) fn log_remote_failure(log: &dyn Log, step: &str, err: &Error) {
    let _ = log.log(
        &LogRecord::new(LogLevel::Warn, "usecase", "remote", format!("{} failed", step))
            .field("step", step)
            .field("error", err.to_string()),
    );
}

/// 失敗なら記録してそのまま返す
pub(crate) fn logged<T>(log: &dyn Log, step: &str, result: Result<T, Error>) -> Result<T, Error> {
    if let Err(ref e) = result {
        log_remote_failure(log, step, e);
    }
    result
}

/// 挿入・更新で返った行の id（文字列でも数値でもよい）
pub(crate) fn row_id(row: &Value) -> Result<String, Error> {
    match row.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(Error::json("row returned without id")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::MemoryLog;
    use serde_json::json;

    #[test]
    fn test_row_id() {
        assert_eq!(row_id(&json!({"id": "p1"})).unwrap(), "p1");
        assert_eq!(row_id(&json!({"id": 42})).unwrap(), "42");
        assert!(row_id(&json!({"id": ""})).is_err());
        assert!(row_id(&json!({})).is_err());
    }

    #[test]
    fn test_logged_records_failures_only() {
        let log = MemoryLog::new();
        let ok: Result<i32, Error> = logged(&log, "load posts", Ok(1));
        assert_eq!(ok.unwrap(), 1);
        let err: Result<i32, Error> = logged(&log, "load posts", Err(Error::http("down")));
        assert!(err.is_err());
        assert_eq!(log.messages_of_kind("remote"), vec!["load posts failed".to_string()]);
    }
}
