use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttendanceError {
    #[error("Cannot mark {date}: it is after today ({today})")]
    InvalidDate { date: NaiveDate, today: NaiveDate },

    #[error("Unknown attendance status '{0}'. Use: present, absent, no-class")]
    UnknownStatus(String),

    #[error("Invalid course identifier '{0}'")]
    InvalidCourse(String),

    #[error("Could not parse date '{0}'. Use YYYY-MM-DD")]
    UnparseableDate(String),

    #[error("Invalid grade input: {0}")]
    InvalidGrade(String),

    #[error("Subject '{0}' not found")]
    SubjectNotFound(String),

    #[error("Subject name cannot be blank")]
    BlankSubjectName,

    #[error("Subject '{0}' already exists")]
    DuplicateSubject(String),
}
