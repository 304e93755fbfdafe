use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AttendanceError;
use crate::models::SubjectAttendance;

/// Canonical course identifier: uppercase, separators folded to `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey(String);

impl CourseKey {
    pub fn new(raw: &str) -> Result<Self, AttendanceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AttendanceError::InvalidCourse(raw.to_string()));
        }
        let canonical: String = trimmed
            .chars()
            .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
            .collect::<String>()
            .to_uppercase();
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CourseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CourseKey {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CourseKey {
    type Error = AttendanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CourseKey> for String {
    fn from(key: CourseKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSemesterAttendance {
    pub course: CourseKey,
    pub semester: u8,
    pub subjects: Vec<SubjectAttendance>,
}

impl CourseSemesterAttendance {
    pub fn new(course: CourseKey, semester: u8) -> Self {
        Self {
            course,
            semester,
            subjects: Vec::new(),
        }
    }

    pub fn subject(&self, name: &str) -> Option<&SubjectAttendance> {
        self.subjects
            .iter()
            .find(|s| s.name.to_lowercase() == name.trim().to_lowercase())
    }

    pub fn subject_mut(&mut self, name: &str) -> Option<&mut SubjectAttendance> {
        self.subjects
            .iter_mut()
            .find(|s| s.name.to_lowercase() == name.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differently_formatted_courses_collide() {
        let a = CourseKey::new("cs-101").unwrap();
        let b = CourseKey::new("  CS 101 ").unwrap();
        let c = CourseKey::new("Cs_101").unwrap();
        assert_eq!(a.as_str(), "CS_101");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn empty_course_is_rejected() {
        assert_eq!(
            CourseKey::new("   "),
            Err(AttendanceError::InvalidCourse("   ".to_string()))
        );
    }

    #[test]
    fn course_key_deserializes_through_normalization() {
        let key: CourseKey = serde_json::from_str(r#""b-tech""#).unwrap();
        assert_eq!(key.as_str(), "B_TECH");
    }

    #[test]
    fn subject_lookup_ignores_case() {
        let mut doc = CourseSemesterAttendance::new(CourseKey::new("mca").unwrap(), 2);
        doc.subjects.push(SubjectAttendance::new("Data Structures", 75, None));
        assert!(doc.subject("data structures").is_some());
        assert!(doc.subject_mut("DATA STRUCTURES ").is_some());
        assert!(doc.subject("Networks").is_none());
    }
}
