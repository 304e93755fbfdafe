#![allow(dead_code)]
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::AttendanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Marked,
    Unmarked,
}

impl ToggleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleAction::Marked => "marked",
            ToggleAction::Unmarked => "unmarked",
        }
    }
}

/// Ordered set of calendar days, one entry per day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkedDates(BTreeSet<NaiveDate>);

impl MarkedDates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.0.iter()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.0.last().copied()
    }

    /// Flip membership of `date`. Days after `today` are refused.
    pub fn toggle(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleAction, AttendanceError> {
        if date > today {
            return Err(AttendanceError::InvalidDate { date, today });
        }
        if self.0.remove(&date) {
            Ok(ToggleAction::Unmarked)
        } else {
            self.0.insert(date);
            Ok(ToggleAction::Marked)
        }
    }
}

impl FromIterator<NaiveDate> for MarkedDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
