//! 时间显示模块
//!
//! 服务端的时间字段是 ISO 8601 字符串，这里负责把它们转成列表里展示的日期。
//! 解析失败时不报错，直接回退为占位符，避免一个坏字段拖垮整页。

use crate::MonthKey;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 无法解析时的占位文本
pub const DATE_PLACEHOLDER: &str = "—";

/// 解析 RFC 3339 / ISO 8601 时间字符串
///
/// 同时接受不带时区的 `2024-03-01T10:00:00` 与纯日期 `2024-03-01`，按 UTC 处理。
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 格式化为 `YYYY-MM-DD`
pub fn format_date(value: Option<&str>) -> String {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}

/// 按月统计的横轴标签，如 `3/2024`；缺失的月份按 0 显示
pub fn month_label(key: &MonthKey) -> String {
    format!("{}/{}", key.month, key.year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_server_formats() {
        assert_eq!(format_date(Some("2024-03-05T10:20:30.000Z")), "2024-03-05");
        assert_eq!(format_date(Some("2024-03-05T23:59:59+02:00")), "2024-03-05");
        assert_eq!(format_date(Some("2024-03-05T10:20:30")), "2024-03-05");
        assert_eq!(format_date(Some("2024-03-05")), "2024-03-05");
    }

    #[test]
    fn invalid_dates_fall_back_to_placeholder() {
        assert_eq!(format_date(Some("yesterday")), DATE_PLACEHOLDER);
        assert_eq!(format_date(Some("")), DATE_PLACEHOLDER);
        assert_eq!(format_date(None), DATE_PLACEHOLDER);
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label(&MonthKey { year: 2024, month: 3 }), "3/2024");
    }
}
