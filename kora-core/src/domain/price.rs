//! Daily price history and calendar-month keys.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One daily close from `krx.price_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// `YYYY-MM-DD` as sent by the backend.
    pub date: String,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: date.into(),
            close,
            volume: None,
        }
    }

    /// Parsed trading date. Accepts `YYYY-MM-DD`, `YYYYMMDD` and ISO timestamps.
    pub fn day(&self) -> Option<NaiveDate> {
        parse_day(&self.date)
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.day().map(YearMonth::from)
    }
}

pub(crate) fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y%m%d"))
        .ok()
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// The month `n` months after this one.
    pub fn plus_months(self, n: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(parse_day("2024-03-07"), expected);
        assert_eq!(parse_day("20240307"), expected);
        assert_eq!(parse_day("2024-03-07T09:00:00"), expected);
        assert_eq!(parse_day("yesterday"), None);
    }

    #[test]
    fn month_arithmetic_wraps_years() {
        let nov = YearMonth::new(2024, 11);
        assert_eq!(nov.plus_months(1), YearMonth::new(2024, 12));
        assert_eq!(nov.plus_months(2), YearMonth::new(2025, 1));
        assert_eq!(nov.plus_months(14), YearMonth::new(2026, 1));
        assert_eq!(nov.to_string(), "2024-11");
    }
}
