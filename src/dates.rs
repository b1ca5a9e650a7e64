//! Date-window validation for earnings and budgets.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};

/// A validated inclusive date window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Parses an ISO `YYYY-MM-DD` date string.
pub fn parse_date(raw: &str) -> LedgerResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|_| LedgerError::InvalidDate(raw.to_string()))
}

/// Validates a window, defaulting the end to one month past the start.
///
/// The enforced minimum span is deliberately coarse: the end must land in a
/// different calendar month (month and year) than the start.
pub fn validate_range(start: NaiveDate, end: Option<NaiveDate>) -> LedgerResult<DateRange> {
    let end = end.unwrap_or_else(|| shift_month(start, 1));
    if end < start {
        return Err(LedgerError::InvalidDateRange(format!(
            "end {} precedes start {}",
            end, start
        )));
    }
    if start.year() == end.year() && start.month() == end.month() {
        return Err(LedgerError::InvalidDateRange(
            "the window must cross a month boundary".into(),
        ));
    }
    Ok(DateRange { start, end })
}

/// Coerces string inputs and validates them as one window.
pub fn validate_range_str(start: &str, end: Option<&str>) -> LedgerResult<DateRange> {
    let start = parse_date(start)?;
    let end = end.map(parse_date).transpose()?;
    validate_range(start, end)
}

/// Shifts a date by whole months, clamping the day to the target month.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_end_to_one_month_after_start() {
        let range = validate_range(date(2025, 3, 10), None).unwrap();
        assert_eq!(range.end, date(2025, 4, 10));
    }

    #[test]
    fn month_shift_clamps_the_day() {
        assert_eq!(shift_month(date(2025, 1, 31), 1), date(2025, 2, 28));
        assert_eq!(shift_month(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift_month(date(2025, 3, 31), -1), date(2025, 2, 28));
    }

    #[test]
    fn rejects_end_before_start() {
        let err = validate_range(date(2025, 3, 10), Some(date(2025, 2, 10))).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDateRange(_)));
    }

    #[test]
    fn rejects_windows_inside_a_single_month() {
        let err = validate_range(date(2025, 3, 1), Some(date(2025, 3, 31))).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDateRange(_)));
    }

    #[test]
    fn accepts_same_month_of_a_different_year() {
        let range = validate_range(date(2025, 3, 1), Some(date(2026, 3, 1))).unwrap();
        assert_eq!(range.start, date(2025, 3, 1));
        assert_eq!(range.end, date(2026, 3, 1));
    }

    #[test]
    fn accepted_windows_satisfy_the_range_law() {
        for (start, end) in [
            (date(2025, 1, 15), Some(date(2025, 2, 1))),
            (date(2025, 3, 10), None),
            (date(2024, 12, 31), Some(date(2025, 1, 1))),
        ] {
            let range = validate_range(start, end).unwrap();
            assert!(range.end >= range.start);
            assert!(
                range.start.year() != range.end.year()
                    || range.start.month() != range.end.month()
            );
        }
    }

    #[test]
    fn coerces_and_rejects_string_input() {
        let range = validate_range_str("2025-03-10", Some("2025-04-10")).unwrap();
        assert_eq!(range.start, date(2025, 3, 10));
        assert!(matches!(
            validate_range_str("not-a-date", None),
            Err(LedgerError::InvalidDate(_))
        ));
    }
}
