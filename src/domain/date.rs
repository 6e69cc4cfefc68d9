//! Civil calendar dates in strict `YYYY-MM-DD` form.
//!
//! Dates are timezone-free: they are never converted to instants, so month
//! arithmetic cannot drift across DST or UTC offsets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Invalid YYYY-MM-DD date: {0}")]
    Invalid(String),
    #[error("Date arithmetic out of range")]
    OutOfRange,
}

/// A calendar-valid `YYYY-MM-DD` date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ymd(NaiveDate);

impl Ymd {
    /// Parse a strict, zero-padded `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Returns `DateError::Invalid` for malformed shapes (`2025-1-01`) and for
    /// calendar-impossible dates (`2025-02-30`, month 13).
    pub fn parse(value: &str) -> Result<Self, DateError> {
        let (y, m, d) =
            split_ymd(value).ok_or_else(|| DateError::Invalid(value.to_string()))?;
        Self::from_ymd(y, m, d).ok_or_else(|| DateError::Invalid(value.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Ymd)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

fn split_ymd(value: &str) -> Option<(i32, u32, u32)> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[5..7].parse().ok()?;
    let day = value[8..10].parse().ok()?;
    Some((year, month, day))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl fmt::Display for Ymd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for Ymd {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Ymd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ymd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ymd::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Strict shape + calendar validity check.
pub fn is_valid_ymd(value: &str) -> bool {
    Ymd::parse(value).is_ok()
}

/// Three-way comparison of two date strings by (year, month, day).
///
/// # Errors
/// Fails if either side is not a valid date.
pub fn compare_ymd(a: &str, b: &str) -> Result<Ordering, DateError> {
    Ok(Ymd::parse(a)?.cmp(&Ymd::parse(b)?))
}

/// Count of full elapsed calendar months from `from` to `to`.
///
/// A partial final month is floored away when `to`'s day-of-month is below
/// `from`'s, so Jan 31 -> Feb 28 is 0 months. Returns 0 when `to < from`.
pub fn months_between_floor(from: Ymd, to: Ymd) -> u32 {
    if to < from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Move `months` whole months from `date` and reattach `day_of_month`.
///
/// The day is clamped into the target month, so callers anchoring on days
/// 1..=28 always land on exactly that day.
pub fn add_months_keep_day_clamped(date: Ymd, months: u32, day_of_month: u32) -> Ymd {
    let ordinal = date.year() as i64 * 12 + (date.month() as i64 - 1) + months as i64;
    let year = ordinal.div_euclid(12) as i32;
    let month = ordinal.rem_euclid(12) as u32 + 1;
    let day = day_of_month.clamp(1, days_in_month(year, month));
    // Year/month come from a valid ordinal and day is clamped into the month.
    Ymd::from_ymd(year, month, day).unwrap_or(date)
}

/// Pure calendar day addition.
///
/// # Errors
/// Fails only when the result leaves chrono's representable range.
pub fn add_days_ymd(date: Ymd, days: i64) -> Result<Ymd, DateError> {
    date.0
        .checked_add_signed(chrono::Duration::days(days))
        .map(Ymd)
        .ok_or(DateError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(s: &str) -> Ymd {
        Ymd::parse(s).unwrap()
    }

    #[test]
    fn validates_calendar_dates() {
        assert!(is_valid_ymd("2025-12-31"));
        assert!(is_valid_ymd("2024-02-29"));
        assert!(!is_valid_ymd("2025-02-29"));
        assert!(!is_valid_ymd("2025-02-30"));
        assert!(!is_valid_ymd("2025-13-01"));
        assert!(!is_valid_ymd("2025-00-10"));
        assert!(!is_valid_ymd("2025-1-01"));
        assert!(!is_valid_ymd("2025-01-1"));
        assert!(!is_valid_ymd("2025/01/01"));
        assert!(!is_valid_ymd(" 2025-01-01"));
    }

    #[test]
    fn compares_without_timezone_offsets() {
        assert_eq!(compare_ymd("2025-01-01", "2025-01-02"), Ok(Ordering::Less));
        assert_eq!(compare_ymd("2025-01-02", "2025-01-01"), Ok(Ordering::Greater));
        assert_eq!(compare_ymd("2025-01-01", "2025-01-01"), Ok(Ordering::Equal));
        assert!(compare_ymd("2025-02-30", "2025-01-01").is_err());
    }

    #[test]
    fn months_between_uses_full_month_rule() {
        assert_eq!(months_between_floor(ymd("2025-01-15"), ymd("2026-01-15")), 12);
        assert_eq!(months_between_floor(ymd("2025-01-15"), ymd("2026-01-14")), 11);
        assert_eq!(months_between_floor(ymd("2025-01-31"), ymd("2025-02-28")), 0);
        assert_eq!(months_between_floor(ymd("2025-03-01"), ymd("2025-01-01")), 0);
    }

    #[test]
    fn add_months_keeps_anchor_day() {
        assert_eq!(
            add_months_keep_day_clamped(ymd("2025-01-10"), 1, 28).to_string(),
            "2025-02-28"
        );
        assert_eq!(
            add_months_keep_day_clamped(ymd("2025-11-05"), 3, 5).to_string(),
            "2026-02-05"
        );
        assert_eq!(
            add_months_keep_day_clamped(ymd("2025-01-31"), 1, 31).to_string(),
            "2025-02-28"
        );
    }

    #[test]
    fn add_days_crosses_month_and_leap_boundaries() {
        assert_eq!(add_days_ymd(ymd("2024-02-28"), 1).unwrap().to_string(), "2024-02-29");
        assert_eq!(add_days_ymd(ymd("2024-01-01"), 30).unwrap().to_string(), "2024-01-31");
        assert_eq!(add_days_ymd(ymd("2024-01-01"), -1).unwrap().to_string(), "2023-12-31");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ymd("2024-06-01")).unwrap();
        assert_eq!(json, "\"2024-06-01\"");
        let parsed: Result<Ymd, _> = serde_json::from_str("\"2024-06-31\"");
        assert!(parsed.is_err());
    }
}
