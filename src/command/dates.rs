//! Duration and due-date expressions in zh-TW and English

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Working hours counted for one day of effort
pub const HOURS_PER_DAY: f64 = 8.0;

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:小時|時|hours?|hrs?|h)").expect("hours pattern")
});

static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:天|日|days?|d)").expect("days pattern")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)$").expect("number pattern"));

static MONTH_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*月\s*(\d{1,2})\s*[日號号]").expect("month-day pattern"));

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").expect("iso date pattern"));

/// Parse an effort estimate into hours.
///
/// `8小時`, `2.5h`, `3 hours` are hours; `2天`, `1 day`, `3d` are working
/// days; a bare number is hours. Zero and unreadable text give `None`.
pub fn parse_duration_hours(text: &str) -> Option<f64> {
    let text = text.trim();

    let hours = if let Some(caps) = HOURS_RE.captures(text) {
        caps[1].parse::<f64>().ok()
    } else if let Some(caps) = DAYS_RE.captures(text) {
        caps[1].parse::<f64>().ok().map(|d| d * HOURS_PER_DAY)
    } else if let Some(caps) = NUMBER_RE.captures(text) {
        caps[1].parse::<f64>().ok()
    } else {
        None
    };

    hours.filter(|h| *h > 0.0 && h.is_finite())
}

/// Parse a due date relative to `today`.
///
/// `7月11日` lands on the next such day from today, so a date that has gone
/// by this year rolls into the next year where it exists. `2026-07-11` is taken as written. 明天/後天/下週 and their
/// English forms count forward from today.
pub fn parse_due_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();

    if let Some(caps) = MONTH_DAY_RE.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        // 2月29日 may need up to eight years to reach a leap year
        return (today.year()..=today.year() + 8)
            .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
            .find(|date| *date >= today);
    }

    if let Some(caps) = ISO_DATE_RE.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let lower = text.to_lowercase();
    let offset = if lower.contains("後天") || lower.contains("后天") || lower.contains("day after tomorrow") {
        2
    } else if lower.contains("明天") || lower.contains("tomorrow") {
        1
    } else if lower.contains("下週") || lower.contains("下周") || lower.contains("next week") {
        7
    } else {
        return None;
    };

    today.checked_add_days(Days::new(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(parse_duration_hours("8小時"), Some(8.0));
        assert_eq!(parse_duration_hours("2.5 h"), Some(2.5));
        assert_eq!(parse_duration_hours("3 hours"), Some(3.0));
        assert_eq!(parse_duration_hours("2天"), Some(16.0));
        assert_eq!(parse_duration_hours("1 day"), Some(8.0));
        assert_eq!(parse_duration_hours("0.5d"), Some(4.0));
        assert_eq!(parse_duration_hours("6"), Some(6.0));
    }

    #[test]
    fn test_duration_rejects_zero_and_noise() {
        assert_eq!(parse_duration_hours("0"), None);
        assert_eq!(parse_duration_hours("0小時"), None);
        assert_eq!(parse_duration_hours("a while"), None);
        assert_eq!(parse_duration_hours(""), None);
    }

    #[test]
    fn test_month_day_this_year() {
        let today = day(2026, 3, 10);
        assert_eq!(parse_due_date("7月11日", today), Some(day(2026, 7, 11)));
        assert_eq!(parse_due_date("3月10日", today), Some(day(2026, 3, 10)));
    }

    #[test]
    fn test_month_day_rolls_over() {
        let today = day(2026, 3, 10);
        assert_eq!(parse_due_date("1月5日", today), Some(day(2027, 1, 5)));
    }

    #[test]
    fn test_leap_day_rolls_to_next_leap_year() {
        assert_eq!(parse_due_date("2月29日", day(2027, 3, 10)), Some(day(2028, 2, 29)));
        assert_eq!(parse_due_date("2月29日", day(2028, 1, 20)), Some(day(2028, 2, 29)));
        assert_eq!(parse_due_date("2月29日", day(2028, 3, 1)), Some(day(2032, 2, 29)));
    }

    #[test]
    fn test_month_day_invalid_calendar_date() {
        let today = day(2026, 3, 10);
        assert_eq!(parse_due_date("2月30日", today), None);
        assert_eq!(parse_due_date("13月1日", today), None);
    }

    #[test]
    fn test_iso_date() {
        let today = day(2026, 3, 10);
        assert_eq!(parse_due_date("2026-12-31", today), Some(day(2026, 12, 31)));
        assert_eq!(parse_due_date("2026/7/1", today), Some(day(2026, 7, 1)));
    }

    #[test]
    fn test_relative_terms() {
        let today = day(2026, 12, 31);
        assert_eq!(parse_due_date("明天", today), Some(day(2027, 1, 1)));
        assert_eq!(parse_due_date("後天", today), Some(day(2027, 1, 2)));
        assert_eq!(parse_due_date("下週", today), Some(day(2027, 1, 7)));
        assert_eq!(parse_due_date("下周", today), Some(day(2027, 1, 7)));
        assert_eq!(parse_due_date("Tomorrow", today), Some(day(2027, 1, 1)));
        assert_eq!(parse_due_date("day after tomorrow", today), Some(day(2027, 1, 2)));
        assert_eq!(parse_due_date("next week", today), Some(day(2027, 1, 7)));
        assert_eq!(parse_due_date("someday", today), None);
    }
}
