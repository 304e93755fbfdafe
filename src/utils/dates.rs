use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::AttendanceError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date, discarding any time-of-day part.
///
/// Timestamps with an offset keep the calendar day they name in that offset.
pub fn parse_day(input: &str) -> Result<NaiveDate, AttendanceError> {
    let s = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| AttendanceError::UnparseableDate(input.to_string()))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
