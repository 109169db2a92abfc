//! Time module for astronomical time calculations
//!
//! Every solver in this crate works on a continuous day-number scalar: the
//! Julian date. This module converts between that scalar and calendar
//! dates or `chrono` datetimes. The calendar arithmetic follows the
//! Explanatory Supplement to the Astronomical Almanac 15.11, as Skyfield does.
//!
//! No distinction is made between UTC, UT1 and TT here; the event solver
//! tolerates the resulting ~70 s offset, and callers needing a strict time
//! scale should convert before calling in.

use crate::constants::{DAY_S, GREGORIAN_START, UNIX_EPOCH_JD};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Calendar tuple for representing a date and time
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarTuple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarTuple {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Julian date of this calendar instant
    pub fn to_jd(&self) -> f64 {
        let day_fraction =
            (self.hour as f64 + self.minute as f64 / 60.0 + self.second / 3600.0) / 24.0;
        // Julian day numbers begin at noon
        julian_day(self.year, self.month, self.day) as f64 - 0.5 + day_fraction
    }

    /// Calendar instant of a Julian date
    pub fn from_jd(jd: f64) -> Self {
        let jd_plus_half = jd + 0.5;
        let z = jd_plus_half.floor();
        let f = jd_plus_half - z;

        let (year, month, day) = julian_day_to_calendar_date(z as i32);

        let seconds_in_day = f * DAY_S;
        let hour = (seconds_in_day / 3600.0).floor() as u32;
        let minute = ((seconds_in_day - hour as f64 * 3600.0) / 60.0).floor() as u32;
        let second = seconds_in_day - hour as f64 * 3600.0 - minute as f64 * 60.0;

        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

/// Normalize a month value to the range 1-12, adjusting the year as needed
fn normalize_month(year: i32, month: u32) -> (i32, u32) {
    if (1..=12).contains(&month) {
        return (year, month);
    }

    let month_0 = month as i32 - 1;
    let year_offset = month_0.div_euclid(12);
    let month_norm = month_0.rem_euclid(12);

    (year + year_offset, (month_norm + 1) as u32)
}

/// Calculate the Julian day number (the day beginning at noon) of a calendar date
///
/// Dates before 1582-10-15 are taken from the Julian calendar.
pub fn julian_day(year: i32, month: u32, day: u32) -> i32 {
    let (year, month) = normalize_month(year, month);

    let janfeb = month <= 2;
    let g = year + 4716 - if janfeb { 1 } else { 0 };
    let f = (month + 9) % 12;
    let e = 1461 * g / 4 + day as i32 - 1402;
    let mut j = e + (153 * f as i32 + 2) / 5;

    if j >= GREGORIAN_START {
        j += 38 - (g + 184) / 100 * 3 / 4;
    }

    j
}

/// Convert a Julian day number back to a calendar date
pub fn julian_day_to_calendar_date(jd: i32) -> (i32, u32, u32) {
    let mut f = jd + 1401;

    if jd >= GREGORIAN_START {
        f += (4 * jd + 274277) / 146097 * 3 / 4 - 38;
    }

    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;

    let day = (h % 153) / 5 + 1;
    let month = ((h / 153) + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year, month as u32, day as u32)
}

/// Julian date of a UTC datetime
pub fn jd_from_datetime(dt: DateTime<Utc>) -> f64 {
    CalendarTuple::new(
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second() as f64 + dt.nanosecond() as f64 / 1_000_000_000.0,
    )
    .to_jd()
}

/// UTC datetime of a Julian date, rounded to the millisecond
pub fn datetime_from_jd(jd: f64) -> Result<DateTime<Utc>> {
    if !jd.is_finite() {
        return Err(TimeError::OutOfRange(format!("{jd}")));
    }
    let millis = ((jd - UNIX_EPOCH_JD) * DAY_S * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return Err(TimeError::OutOfRange(format!("{jd}")));
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .ok_or_else(|| TimeError::OutOfRange(format!("{jd}")))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date into a Julian date
pub fn parse_jd(text: &str) -> Result<f64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(jd_from_datetime(dt.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(CalendarTuple::new(date.year(), date.month(), date.day(), 0, 0, 0.0).to_jd());
    }
    if let Some(jd) = text.strip_prefix("JD").and_then(|s| s.trim().parse::<f64>().ok()) {
        return Ok(jd);
    }
    Err(TimeError::InvalidFormat(text.to_string()))
}

/// Format a Julian date as an ISO 8601 UTC string with whole seconds
pub fn format_jd(jd: f64) -> Result<String> {
    let dt = datetime_from_jd(jd)?;
    Ok(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::J2000;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 1, 1, 2_451_545)]
    #[case(2001, 10, 18, 2_452_201)]
    #[case(1582, 10, 15, 2_299_161)]
    #[case(1582, 10, 4, 2_299_160)]
    fn test_julian_day_numbers(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: i32,
    ) {
        assert_eq!(julian_day(year, month, day), expected);
        assert_eq!(julian_day_to_calendar_date(expected), (year, month, day));
    }

    #[test]
    fn test_month_overflow_rolls_year() {
        assert_eq!(julian_day(2000, 13, 1), julian_day(2001, 1, 1));
    }

    #[test]
    fn test_j2000_from_datetime() {
        let date = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_relative_eq!(jd_from_datetime(date), J2000, epsilon = 1e-9);
    }

    #[test]
    fn test_calendar_round_trip() {
        let cal = CalendarTuple::from_jd(2_452_200.75);
        assert_eq!((cal.year, cal.month, cal.day, cal.hour), (2001, 10, 18, 6));
        assert_relative_eq!(cal.to_jd(), 2_452_200.75, epsilon = 1e-9);
    }

    #[test]
    fn test_datetime_from_jd() {
        let dt = datetime_from_jd(J2000 + 0.25).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2000, 1, 1, 18, 0, 0).unwrap());
        assert!(datetime_from_jd(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_jd_formats() {
        assert_relative_eq!(parse_jd("2001-10-18").unwrap(), 2_452_200.5);
        assert_relative_eq!(
            parse_jd("2000-01-01T12:00:00Z").unwrap(),
            J2000,
            epsilon = 1e-9
        );
        assert_relative_eq!(parse_jd("JD 2451545.25").unwrap(), 2_451_545.25);
        assert!(matches!(
            parse_jd("yesterday"),
            Err(TimeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_format_jd() {
        assert_eq!(format_jd(J2000).unwrap(), "2000-01-01T12:00:00Z");
    }
}
