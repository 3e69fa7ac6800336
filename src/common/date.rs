use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

/// ISO dates, as written by the workplace account export.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
/// Slash dates without zero padding, as written by the quote export.
pub const MARKET_DATE_FORMAT: &str = "%Y/%m/%d";
/// Display form used in the import summary, e.g. `Fri Jan 5, 2024`.
pub const DISPLAY_DATE_FORMAT: &str = "%a %b %-d, %Y";

pub fn parse_date(s: &str, format: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), format)
}

/// Years the host's `YYYYMMDD` encoding can hold.
pub const LEDGER_YEARS: RangeInclusive<i32> = 1..=9999;

/// Encodes a date as the host ledger's `YYYYMMDD` integer. Years before 1
/// encode as 0, which decodes to no date.
pub fn to_date_int(date: NaiveDate) -> u32 {
    let encoded = i64::from(date.year()) * 10_000 + i64::from(date.month() * 100 + date.day());
    u32::try_from(encoded).unwrap_or(0)
}

pub fn from_date_int(date_int: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        (date_int / 10_000) as i32,
        date_int / 100 % 100,
        date_int % 100,
    )
}

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_export_formats() {
        assert_eq!(parse_date("2024-01-05", ISO_DATE_FORMAT).unwrap(), ymd(2024, 1, 5));
        assert_eq!(parse_date("2024/1/5", MARKET_DATE_FORMAT).unwrap(), ymd(2024, 1, 5));
        assert_eq!(parse_date(" 2024/12/31 ", MARKET_DATE_FORMAT).unwrap(), ymd(2024, 12, 31));
        assert!(parse_date("01/05/2024", ISO_DATE_FORMAT).is_err());
    }

    #[test]
    fn date_int_encoding() {
        assert_eq!(to_date_int(ymd(2024, 1, 5)), 20240105);
        assert_eq!(from_date_int(20240105), Some(ymd(2024, 1, 5)));
        assert_eq!(from_date_int(20240230), None);
    }

    #[test]
    fn date_int_of_negative_year_is_zero() {
        assert_eq!(to_date_int(ymd(-1, 1, 5)), 0);
        assert_eq!(from_date_int(0), None);
        assert!(!LEDGER_YEARS.contains(&-1));
    }

    #[test]
    fn display_matches_summary_style() {
        assert_eq!(display_date(ymd(2024, 1, 5)), "Fri Jan 5, 2024");
    }
}
