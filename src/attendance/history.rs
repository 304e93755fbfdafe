use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::error::AttendanceError;
use crate::models::{AttendanceRecord, AttendanceStatus};

/// Collapse a raw history to one record per day, ascending by date.
/// A later entry for a date replaces any earlier one.
pub fn normalize_history(
    history: impl IntoIterator<Item = AttendanceRecord>,
) -> Vec<AttendanceRecord> {
    let mut by_date: BTreeMap<NaiveDate, AttendanceRecord> = BTreeMap::new();
    for record in history {
        by_date.insert(record.date, record);
    }
    by_date.into_values().collect()
}

/// Number of days a reset covers: `start..=today`, never fewer than one.
pub fn reset_day_count(start: NaiveDate, today: NaiveDate) -> i64 {
    ((today - start).num_days() + 1).max(1)
}

/// Rebuild a subject's history as one `no-class` day per date from its start through today.
pub fn reset_subject_history(
    start_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<AttendanceRecord> {
    let start = start_date.unwrap_or(today);
    (0..reset_day_count(start, today))
        .map(|offset| AttendanceRecord::new(start + Duration::days(offset), AttendanceStatus::NoClass))
        .collect()
}

/// Record `status` for `date` and re-normalize, so re-marking a day overwrites it.
pub fn mark_day(
    history: &[AttendanceRecord],
    date: NaiveDate,
    status: AttendanceStatus,
    today: NaiveDate,
) -> Result<Vec<AttendanceRecord>, AttendanceError> {
    if date > today {
        return Err(AttendanceError::InvalidDate { date, today });
    }
    let updated = history
        .iter()
        .cloned()
        .chain(std::iter::once(AttendanceRecord::new(date, status)));
    Ok(normalize_history(updated))
}
