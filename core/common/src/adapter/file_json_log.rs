//! ファイルへ JSONL で追記する Log 実装
//!
//! ログの出力先はファイルのみ。エラー時のコンソール表示（stderr）とは別。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogRecord};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: std::path::PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(record)?;
        use std::io::Write;
        w.write_all(line.as_bytes())
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.write_all(b"\n")
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.flush().map_err(|e| Error::io_msg(e.to_string()))?;
        Ok(())
    }
}

/// 何も出力しない Log 実装（テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

/// 受け取ったレコードをメモリに溜める Log 実装（テストでの検証用）
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// kind が一致するレコードのメッセージ一覧
    pub fn messages_of_kind(&self, kind: &str) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.kind.as_deref() == Some(kind))
            .map(|r| r.message)
            .collect()
    }
}

impl Log for MemoryLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        self.records
            .lock()
            .map_err(|_| Error::system("log lock poisoned"))?
            .push(record.clone());
        Ok(())
    }
}

/// 複数の Log へ順に書き出す。1 つが失敗しても残りには書く。
pub struct TeeLog {
    logs: Vec<Arc<dyn Log>>,
}

impl TeeLog {
    pub fn new(logs: Vec<Arc<dyn Log>>) -> Self {
        Self { logs }
    }
}

impl Log for TeeLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for log in &self.logs {
            if let Err(e) = log.log(record) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StdFileSystem;
    use crate::ports::outbound::{now_iso8601, LogLevel};

    fn record(msg: &str) -> LogRecord {
        LogRecord {
            ts: now_iso8601(),
            level: LogLevel::Info,
            message: msg.to_string(),
            layer: None,
            kind: Some("test".to_string()),
            fields: None,
        }
    }

    #[test]
    fn test_noop_log() {
        assert!(NoopLog.log(&record("test")).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("journal.log");
        let log = FileJsonLog::new(Arc::new(StdFileSystem), &path);
        log.log(&record("one")).unwrap();
        log.log(&record("two")).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(v["message"], "two");
    }

    #[test]
    fn test_tee_log_writes_everywhere() {
        let a = Arc::new(MemoryLog::new());
        let b = Arc::new(MemoryLog::new());
        let tee = TeeLog::new(vec![a.clone(), b.clone()]);
        tee.log(&record("x")).unwrap();
        assert_eq!(a.messages_of_kind("test"), vec!["x".to_string()]);
        assert_eq!(b.records().len(), 1);
    }
}
