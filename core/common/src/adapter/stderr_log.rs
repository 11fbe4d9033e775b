//! 人間向けログ（LogRecord → stderr に要点のみ出力）
//!
//! --verbose 指定時だけ FileJsonLog と併用する。fields の全量は出さず要点のみ。

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};

const FIELDS_SUMMARY_MAX: usize = 400;

/// fields の要点だけを短い文字列にする（巨大化防止）
fn fields_summary(record: &LogRecord) -> String {
    let Some(fields) = record.fields.as_ref().filter(|f| !f.is_empty()) else {
        return String::new();
    };
    let s = serde_json::to_string(fields).unwrap_or_default();
    if s.len() <= FIELDS_SUMMARY_MAX {
        return s;
    }
    let truncated = s.chars().take(FIELDS_SUMMARY_MAX).collect::<String>();
    format!("{}... (len={})", truncated, s.len())
}

fn format_line(record: &LogRecord) -> String {
    let level = match record.level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
    };
    let kind = record.kind.as_deref().unwrap_or("-");
    let summary = fields_summary(record);
    if summary.is_empty() {
        format!("[{}] {} {}", level, kind, record.message)
    } else {
        format!("[{}] {} {} {}", level, kind, record.message, summary)
    }
}

/// 人間向けに stderr へ出す Log
#[derive(Debug, Clone, Default)]
pub struct StderrLog;

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        eprintln!("{}", format_line(record));
        Ok(())
    }
}
