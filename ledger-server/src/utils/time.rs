//! 时间工具函数
//!
//! Repository 层只接收 `i64` Unix millis；换算在这里集中完成。

use chrono::{TimeZone, Utc};

pub const fn minutes_ms(n: i64) -> i64 {
    n * 60 * 1000
}

pub const fn hours_ms(n: i64) -> i64 {
    n * 60 * minutes_ms(1)
}

pub const fn days_ms(n: i64) -> i64 {
    n * 24 * hours_ms(1)
}

/// Format a millis timestamp as dd.mm.yyyy for user-facing messages.
pub fn format_date(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%d.%m.%Y").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_helpers() {
        assert_eq!(minutes_ms(5), 300_000);
        assert_eq!(hours_ms(12), 43_200_000);
        assert_eq!(days_ms(3), 259_200_000);
    }

    #[test]
    fn date_formatting() {
        // 2026-08-06 00:00:00 UTC
        assert_eq!(format_date(1_785_974_400_000), "06.08.2026");
    }
}
