use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::MarkedDates;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub completed_dates: MarkedDates,
}

impl Todo {
    pub fn is_done_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(date)
    }
}
