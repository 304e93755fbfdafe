use chrono::NaiveDate;

use crate::error::AttendanceError;
use crate::models::{MarkedDates, ToggleAction};

/// Non-mutating toggle: returns the updated set alongside the action taken.
pub fn toggle_date(
    marked: &MarkedDates,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(MarkedDates, ToggleAction), AttendanceError> {
    let mut updated = marked.clone();
    let action = updated.toggle(date, today)?;
    Ok((updated, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tomorrow_is_rejected_and_input_untouched() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let marked: MarkedDates = [today].into_iter().collect();

        let err = toggle_date(&marked, tomorrow, today).unwrap_err();
        assert_eq!(err, AttendanceError::InvalidDate { date: tomorrow, today });
        assert_eq!(marked.len(), 1);
    }

    #[test]
    fn toggling_twice_restores_original_set() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let original = MarkedDates::new();

        let (once, first) = toggle_date(&original, day, today).unwrap();
        let (twice, second) = toggle_date(&once, day, today).unwrap();

        assert_eq!(first, ToggleAction::Marked);
        assert_eq!(second, ToggleAction::Unmarked);
        assert!(once.contains(day));
        assert_eq!(twice, original);
    }
}
