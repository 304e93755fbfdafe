use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attendance::normalize_history;
use crate::models::AttendanceRecord;

pub const MIN_GOAL: u8 = 1;
pub const MAX_GOAL: u8 = 100;

/// Clamp a caller-supplied goal into `[MIN_GOAL, MAX_GOAL]`.
pub fn clamp_goal(goal: i64) -> u8 {
    goal.clamp(MIN_GOAL as i64, MAX_GOAL as i64) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttendance {
    pub name: String,
    pub goal: u8,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub history: Vec<AttendanceRecord>,
}

impl SubjectAttendance {
    pub fn new(name: impl Into<String>, goal: i64, start_date: Option<NaiveDate>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            goal: clamp_goal(goal),
            start_date,
            history: Vec::new(),
        }
    }

    pub fn effective_start(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(today)
    }
}

/// Subject as supplied by an import file: goal unclamped, every field but the name optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    pub name: String,
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub history: Vec<AttendanceRecord>,
}

impl SubjectInput {
    pub fn into_subject(self, default_goal: u8) -> SubjectAttendance {
        let mut subject = SubjectAttendance::new(
            self.name,
            self.goal.unwrap_or(default_goal as i64),
            self.start_date,
        );
        subject.history = normalize_history(self.history);
        subject
    }
}

/// Contents of an import file: a bare subject list, or a whole exported document
/// whose course and semester are ignored in favour of the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImportFile {
    Subjects(Vec<SubjectInput>),
    Document { subjects: Vec<SubjectInput> },
}

impl ImportFile {
    pub fn into_subjects(self, default_goal: u8) -> Vec<SubjectAttendance> {
        let inputs = match self {
            ImportFile::Subjects(inputs) => inputs,
            ImportFile::Document { subjects } => subjects,
        };
        inputs
            .into_iter()
            .map(|input| input.into_subject(default_goal))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;

    #[test]
    fn goal_is_clamped_to_valid_range() {
        assert_eq!(clamp_goal(-20), 1);
        assert_eq!(clamp_goal(0), 1);
        assert_eq!(clamp_goal(75), 75);
        assert_eq!(clamp_goal(250), 100);
        assert_eq!(SubjectAttendance::new("Maths", 0, None).goal, 1);
    }

    #[test]
    fn start_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let subject = SubjectAttendance::new("  Physics ", 75, None);
        assert_eq!(subject.name, "Physics");
        assert_eq!(subject.effective_start(today), today);
    }

    #[test]
    fn input_applies_default_goal_and_normalizes_history() {
        let json = r#"{
            "name": "Chemistry",
            "startDate": "2024-01-01",
            "history": [
                {"date": "2024-01-03", "status": "absent"},
                {"date": "2024-01-02", "status": "present"},
                {"date": "2024-01-03", "status": "present"}
            ]
        }"#;
        let input: SubjectInput = serde_json::from_str(json).unwrap();
        let subject = input.into_subject(80);

        assert_eq!(subject.goal, 80);
        assert_eq!(subject.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(subject.history.len(), 2);
        assert_eq!(subject.history[1].status, AttendanceStatus::Present);
    }

    #[test]
    fn import_file_accepts_list_or_document() {
        let list: ImportFile = serde_json::from_str(r#"[{"name": "Art"}]"#).unwrap();
        assert_eq!(list.into_subjects(75)[0].name, "Art");

        let doc: ImportFile = serde_json::from_str(
            r#"{"course": "MCA", "semester": 2, "subjects": [{"name": "Art", "goal": 60, "startDate": null}]}"#,
        )
        .unwrap();
        let subjects = doc.into_subjects(75);
        assert_eq!(subjects[0].goal, 60);
        assert_eq!(subjects[0].start_date, None);
    }

    #[test]
    fn input_goal_out_of_range_is_clamped() {
        let input: SubjectInput = serde_json::from_str(r#"{"name": "Art", "goal": 140}"#).unwrap();
        assert_eq!(input.into_subject(75).goal, 100);
    }
}
