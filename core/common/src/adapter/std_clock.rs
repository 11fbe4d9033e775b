//! 標準時刻実装（SystemTime を委譲）

use crate::ports::outbound::Clock;
use std::time::{SystemTime, UNIX_EPOCH};

/// 標準ライブラリの SystemTime を使う Clock 実装
#[derive(Debug, Clone, Default)]
pub struct StdClock;

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// 固定時刻を返す Clock（テスト用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_secs() {
        let c = FixedClock(1_700_000_123_456);
        assert_eq!(c.now_secs(), 1_700_000_123);
    }

    #[test]
    fn test_std_clock_is_after_2020() {
        assert!(StdClock.now_ms() > 1_577_836_800_000);
    }
}
