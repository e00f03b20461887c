//! Week and month input formats.
//!
//! Browser `week` inputs produce `2024-W05` and `month` inputs produce
//! `2024-02`. Neither is a calendar date, so both are mapped onto one:
//! the given ISO weekday (Monday by default) of the week, or the first day
//! of the month.

use chrono::{NaiveDate, Weekday};

use crate::ConversionError;

/// Parses an ISO 8601 week date, `YYYY-Www` or `YYYY-Www-D`.
pub fn parse_iso_week(raw: &str) -> Result<NaiveDate, ConversionError> {
    let text = raw.trim();
    let invalid = || ConversionError::InvalidWeek(text.to_string());

    let mut parts = text.split('-');
    let year = parts.next().and_then(parse_year).ok_or_else(invalid)?;
    let week = parts
        .next()
        .and_then(|w| w.strip_prefix('W').or_else(|| w.strip_prefix('w')))
        .filter(|w| w.len() == 2)
        .and_then(|w| parse_digits(w))
        .ok_or_else(invalid)?;
    let weekday = match parts.next() {
        None => Weekday::Mon,
        Some(d) => d
            .parse::<u8>()
            .ok()
            .filter(|_| d.len() == 1)
            .and_then(iso_weekday)
            .ok_or_else(invalid)?,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }

    NaiveDate::from_isoywd_opt(year, week, weekday).ok_or_else(invalid)
}

/// Parses a year and month, `YYYY-MM`, into the first day of that month.
pub fn parse_month(raw: &str) -> Result<NaiveDate, ConversionError> {
    let text = raw.trim();
    let invalid = || ConversionError::InvalidMonth(text.to_string());

    let (year, month) = text.split_once('-').ok_or_else(invalid)?;
    let year = parse_year(year).ok_or_else(invalid)?;
    let month = Some(month)
        .filter(|m| m.len() == 2)
        .and_then(parse_digits)
        .ok_or_else(invalid)?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

fn parse_year(text: &str) -> Option<i32> {
    if text.len() != 4 {
        return None;
    }
    parse_digits(text).map(|y| y as i32)
}

fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn iso_weekday(n: u8) -> Option<Weekday> {
    let day = match n {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_starts_on_monday() {
        assert_eq!(parse_iso_week("2024-W05").unwrap(), date(2024, 1, 29));
        assert_eq!(parse_iso_week("2024-W01").unwrap(), date(2024, 1, 1));
    }

    #[test]
    fn test_week_belongs_to_iso_year() {
        // 2021-W01 starts in January, 2020 had 53 weeks
        assert_eq!(parse_iso_week("2021-W01").unwrap(), date(2021, 1, 4));
        assert_eq!(parse_iso_week("2020-W53").unwrap(), date(2020, 12, 28));
        assert!(parse_iso_week("2021-W53").is_err());
    }

    #[test]
    fn test_week_with_day() {
        assert_eq!(parse_iso_week("2024-W05-3").unwrap(), date(2024, 1, 31));
        assert_eq!(parse_iso_week("2024-W05-7").unwrap(), date(2024, 2, 4));
        assert!(parse_iso_week("2024-W05-8").is_err());
    }

    #[test]
    fn test_bad_weeks() {
        for raw in ["not-a-week", "2024-05", "2024-W5", "2024W05", "24-W05", "2024-W05-1-1"] {
            assert_eq!(
                parse_iso_week(raw),
                Err(ConversionError::InvalidWeek(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_month() {
        assert_eq!(parse_month("2024-02").unwrap(), date(2024, 2, 1));
        assert_eq!(parse_month(" 1999-12 ").unwrap(), date(1999, 12, 1));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-2").is_err());
        assert!(parse_month("2024").is_err());
    }
}
