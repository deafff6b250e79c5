//! # Temporal Types: Canonical Date and Time Text
//!
//! Renders `chrono` calendar and clock values into the lexical forms the
//! schema's temporal kinds expect.
//!
//! ## Forms
//!
//! - date: `CCYY-MM-DD`
//! - time: `hh:mm:ss`, followed by `.fff`, `.ffffff` or `.fffffffff` only
//!   when the sub-second part is non-zero
//! - date-time: date and time joined by `T`; zoned values append `±hh:mm`
//! - month-day: `MM-DD`
//! - year: `CCYY`, zero-padded to four digits, with a leading `-` for
//!   years before year zero
//!
//! Sub-second digits use chrono's `%.f`, which picks the shortest of 3, 6
//! or 9 digits that represents the fraction exactly.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Render a calendar date as `CCYY-MM-DD`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render a time of day as `hh:mm:ss[.fff]`.
pub fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S%.f").to_string()
}

/// Render a date-time without zone designator.
pub fn format_date_time(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Render a date-time with its fixed UTC offset (`+00:00`, not `Z`).
pub fn format_zoned_date_time(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string()
}

/// Render the month and day portion of a date as `MM-DD`.
pub fn format_month_day(date: &NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// Render a year number as `CCYY`.
pub fn format_year(year: i64) -> String {
    if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{year:04}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_format() {
        assert_eq!(format_date(&date(2019, 1, 1)), "2019-01-01");
        assert_eq!(format_date(&date(2026, 12, 31)), "2026-12-31");
    }

    #[test]
    fn test_time_without_fraction() {
        let t = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(format_time(&t), "00:00:00");
        let t = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(format_time(&t), "23:59:59");
    }

    #[test]
    fn test_time_with_fraction() {
        let t = NaiveTime::from_hms_milli_opt(8, 30, 0, 250).unwrap();
        assert_eq!(format_time(&t), "08:30:00.250");
        let t = NaiveTime::from_hms_micro_opt(8, 30, 0, 1).unwrap();
        assert_eq!(format_time(&t), "08:30:00.000001");
    }

    #[test]
    fn test_date_time_format() {
        let dt = date(2019, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(format_date_time(&dt), "2019-01-01T00:00:00");
    }

    #[test]
    fn test_zoned_date_time_keeps_offset() {
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let dt = offset.with_ymd_and_hms(2019, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_zoned_date_time(&dt), "2019-01-01T12:00:00+05:30");

        let utc = FixedOffset::east_opt(0).unwrap();
        let dt = utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_zoned_date_time(&dt), "2019-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_month_day_drops_year() {
        assert_eq!(format_month_day(&date(2019, 1, 1)), "01-01");
        assert_eq!(format_month_day(&date(2024, 2, 29)), "02-29");
    }

    #[test]
    fn test_year_padding() {
        assert_eq!(format_year(2019), "2019");
        assert_eq!(format_year(5), "0005");
        assert_eq!(format_year(-44), "-0044");
        assert_eq!(format_year(12345), "12345");
    }
}
