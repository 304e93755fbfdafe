use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::str::FromStr;

use crate::attendance::{normalize_history, reset_subject_history, toggle_date};
use crate::error::AttendanceError;
use crate::models::{
    AttendanceRecord, AttendanceStatus, CourseKey, CourseSemesterAttendance, MarkedDates,
    SubjectAttendance, Todo, ToggleAction,
};
use crate::utils::dates::{format_day, parse_day};

fn parse_stored_date(s: &str) -> Result<NaiveDate> {
    parse_day(s).with_context(|| format!("Bad stored date '{}'", s))
}

// ─── Attendance documents ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DocSummary {
    pub course: CourseKey,
    pub semester: u8,
    pub subject_count: i64,
    pub updated_at: String,
}

pub struct AttendanceRepo;

impl AttendanceRepo {
    fn doc_id(conn: &Connection, course: &CourseKey, semester: u8) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT id FROM attendance_docs WHERE course = ?1 AND semester = ?2",
            params![course.as_str(), semester],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn get(
        conn: &Connection,
        course: &CourseKey,
        semester: u8,
    ) -> Result<Option<CourseSemesterAttendance>> {
        let Some(doc_id) = Self::doc_id(conn, course, semester)? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, name, goal, start_date FROM subjects
             WHERE doc_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![doc_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut doc = CourseSemesterAttendance::new(course.clone(), semester);
        for r in rows {
            let (subject_id, name, goal, start_date) = r?;
            let mut subject = SubjectAttendance::new(
                name,
                goal,
                start_date.as_deref().map(parse_stored_date).transpose()?,
            );
            subject.history = Self::history_for(conn, subject_id)?;
            doc.subjects.push(subject);
        }
        Ok(Some(doc))
    }

    fn history_for(conn: &Connection, subject_id: i64) -> Result<Vec<AttendanceRecord>> {
        let mut stmt = conn.prepare(
            "SELECT date, status FROM attendance_records WHERE subject_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![subject_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut history = Vec::new();
        for r in rows {
            let (date, status) = r?;
            history.push(AttendanceRecord::new(
                parse_stored_date(&date)?,
                AttendanceStatus::from_str(&status)?,
            ));
        }
        Ok(history)
    }

    /// Replace every subject of the (course, semester) document, creating it on first write.
    /// Histories are normalized before they are stored.
    pub fn replace_subjects(
        conn: &Connection,
        course: &CourseKey,
        semester: u8,
        subjects: Vec<SubjectAttendance>,
    ) -> Result<CourseSemesterAttendance> {
        let mut seen = HashSet::new();
        for subject in &subjects {
            if subject.name.trim().is_empty() {
                return Err(AttendanceError::BlankSubjectName.into());
            }
            if !seen.insert(subject.name.to_lowercase()) {
                return Err(AttendanceError::DuplicateSubject(subject.name.clone()).into());
            }
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO attendance_docs (course, semester) VALUES (?1, ?2)
             ON CONFLICT(course, semester) DO UPDATE SET updated_at = datetime('now')",
            params![course.as_str(), semester],
        )?;
        let doc_id: i64 = tx.query_row(
            "SELECT id FROM attendance_docs WHERE course = ?1 AND semester = ?2",
            params![course.as_str(), semester],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM attendance_records
             WHERE subject_id IN (SELECT id FROM subjects WHERE doc_id = ?1)",
            params![doc_id],
        )?;
        tx.execute("DELETE FROM subjects WHERE doc_id = ?1", params![doc_id])?;

        let mut doc = CourseSemesterAttendance::new(course.clone(), semester);
        for (position, mut subject) in subjects.into_iter().enumerate() {
            subject.history = normalize_history(subject.history);
            tx.execute(
                "INSERT INTO subjects (doc_id, name, goal, start_date, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    doc_id,
                    subject.name,
                    subject.goal,
                    subject.start_date.map(format_day),
                    position as i64,
                ],
            )?;
            let subject_id = tx.last_insert_rowid();
            for record in &subject.history {
                tx.execute(
                    "INSERT INTO attendance_records (subject_id, date, status) VALUES (?1, ?2, ?3)",
                    params![subject_id, format_day(record.date), record.status.as_str()],
                )?;
            }
            doc.subjects.push(subject);
        }
        tx.commit()?;

        info!(
            "Stored {} subject(s) for {} semester {}",
            doc.subjects.len(),
            course,
            semester
        );
        Ok(doc)
    }

    pub fn delete(conn: &Connection, course: &CourseKey, semester: u8) -> Result<bool> {
        let Some(doc_id) = Self::doc_id(conn, course, semester)? else {
            return Ok(false);
        };
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM attendance_records
             WHERE subject_id IN (SELECT id FROM subjects WHERE doc_id = ?1)",
            params![doc_id],
        )?;
        tx.execute("DELETE FROM subjects WHERE doc_id = ?1", params![doc_id])?;
        tx.execute("DELETE FROM attendance_docs WHERE id = ?1", params![doc_id])?;
        tx.commit()?;
        info!("Deleted attendance for {} semester {}", course, semester);
        Ok(true)
    }

    /// Regenerate one subject's history as `no-class` days, leaving the rest of the document as is.
    pub fn reset_subject(
        conn: &Connection,
        course: &CourseKey,
        semester: u8,
        subject_name: &str,
        today: NaiveDate,
    ) -> Result<SubjectAttendance> {
        let mut doc = Self::get(conn, course, semester)?
            .ok_or_else(|| AttendanceError::SubjectNotFound(subject_name.to_string()))?;
        let subject = doc
            .subject_mut(subject_name)
            .ok_or_else(|| AttendanceError::SubjectNotFound(subject_name.to_string()))?;
        subject.history = reset_subject_history(subject.start_date, today);
        debug!(
            "Reset '{}' to {} no-class day(s)",
            subject.name,
            subject.history.len()
        );
        let name = subject.name.clone();

        let stored = Self::replace_subjects(conn, course, semester, doc.subjects)?;
        stored
            .subject(&name)
            .cloned()
            .ok_or_else(|| anyhow!("Subject '{}' vanished during reset", name))
    }

    pub fn list(conn: &Connection) -> Result<Vec<DocSummary>> {
        let mut stmt = conn.prepare(
            "SELECT d.course, d.semester, COUNT(s.id), d.updated_at
             FROM attendance_docs d LEFT JOIN subjects s ON s.doc_id = d.id
             GROUP BY d.id
             ORDER BY d.course, d.semester",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (course, semester, subject_count, updated_at) = r?;
            result.push(DocSummary {
                course: CourseKey::new(&course)?,
                semester: u8::try_from(semester)
                    .with_context(|| format!("Bad stored semester {}", semester))?,
                subject_count,
                updated_at: updated_at.unwrap_or_default(),
            });
        }
        Ok(result)
    }
}

// ─── Todos ──────────────────────────────────────────────────────────────────

pub struct TodoRepo;

impl TodoRepo {
    pub fn add(conn: &Connection, title: &str) -> Result<i64> {
        conn.execute("INSERT INTO todos (title) VALUES (?1)", params![title.trim()])?;
        Ok(conn.last_insert_rowid())
    }

    fn completions_for(conn: &Connection, todo_id: i64) -> Result<MarkedDates> {
        let mut stmt =
            conn.prepare("SELECT date FROM todo_completions WHERE todo_id = ?1 ORDER BY date")?;
        let dates: Vec<String> = stmt
            .query_map(params![todo_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        dates.iter().map(|d| parse_stored_date(d)).collect()
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Todo>> {
        let row = conn
            .query_row(
                "SELECT id, title, created_at FROM todos WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((id, title, created_at)) => Ok(Some(Todo {
                id,
                title,
                created_at: created_at.unwrap_or_default(),
                completed_dates: Self::completions_for(conn, id)?,
            })),
        }
    }

    pub fn list(conn: &Connection) -> Result<Vec<Todo>> {
        let mut stmt = conn.prepare("SELECT id FROM todos ORDER BY id")?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut result = Vec::new();
        for id in ids {
            if let Some(todo) = Self::get(conn, id)? {
                result.push(todo);
            }
        }
        Ok(result)
    }

    pub fn toggle(
        conn: &Connection,
        id: i64,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleAction> {
        let todo = Self::get(conn, id)?.ok_or_else(|| anyhow!("Todo #{} not found", id))?;
        let (_, action) = toggle_date(&todo.completed_dates, date, today)?;
        match action {
            ToggleAction::Marked => conn.execute(
                "INSERT OR IGNORE INTO todo_completions (todo_id, date) VALUES (?1, ?2)",
                params![id, format_day(date)],
            )?,
            ToggleAction::Unmarked => conn.execute(
                "DELETE FROM todo_completions WHERE todo_id = ?1 AND date = ?2",
                params![id, format_day(date)],
            )?,
        };
        debug!("Todo #{} {} for {}", id, action.as_str(), date);
        Ok(action)
    }

    pub fn remove(conn: &Connection, id: i64) -> Result<bool> {
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM todo_completions WHERE todo_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::AttendanceStatus::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn subject(name: &str, records: &[(u32, AttendanceStatus)]) -> SubjectAttendance {
        let mut s = SubjectAttendance::new(name, 75, Some(date(1, 1)));
        s.history = records
            .iter()
            .map(|&(d, status)| AttendanceRecord::new(date(1, d), status))
            .collect();
        s
    }

    #[test]
    fn first_write_creates_and_get_reads_back() {
        let conn = setup();
        let key = CourseKey::new("b-tech").unwrap();
        assert!(AttendanceRepo::get(&conn, &key, 3).unwrap().is_none());

        AttendanceRepo::replace_subjects(
            &conn,
            &key,
            3,
            vec![
                subject("Maths", &[(2, Present), (3, Absent)]),
                subject("Physics", &[]),
            ],
        )
        .unwrap();

        let doc = AttendanceRepo::get(&conn, &key, 3).unwrap().unwrap();
        assert_eq!(doc.subjects.len(), 2);
        assert_eq!(doc.subjects[0].name, "Maths");
        assert_eq!(doc.subjects[0].history.len(), 2);
        assert_eq!(doc.subjects[0].start_date, Some(date(1, 1)));
        assert!(doc.subjects[1].history.is_empty());
    }

    #[test]
    fn differently_formatted_course_hits_same_document() {
        let conn = setup();
        AttendanceRepo::replace_subjects(
            &conn,
            &CourseKey::new("cs-101").unwrap(),
            1,
            vec![subject("Maths", &[])],
        )
        .unwrap();
        AttendanceRepo::replace_subjects(
            &conn,
            &CourseKey::new("CS 101").unwrap(),
            1,
            vec![subject("Biology", &[])],
        )
        .unwrap();

        let docs = AttendanceRepo::list(&conn).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].course.as_str(), "CS_101");
        assert_eq!(docs[0].subject_count, 1);
    }

    #[test]
    fn replace_overwrites_instead_of_merging() {
        let conn = setup();
        let key = CourseKey::new("mca").unwrap();
        AttendanceRepo::replace_subjects(
            &conn,
            &key,
            1,
            vec![subject("Maths", &[(1, Present)]), subject("Physics", &[])],
        )
        .unwrap();
        AttendanceRepo::replace_subjects(&conn, &key, 1, vec![subject("Chemistry", &[])]).unwrap();

        let doc = AttendanceRepo::get(&conn, &key, 1).unwrap().unwrap();
        let names: Vec<_> = doc.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Chemistry"]);
        let orphaned: i64 = conn
            .query_row("SELECT COUNT(*) FROM attendance_records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphaned, 0);
    }

    #[test]
    fn history_is_normalized_before_storage() {
        let conn = setup();
        let key = CourseKey::new("mca").unwrap();
        let stored = AttendanceRepo::replace_subjects(
            &conn,
            &key,
            1,
            vec![subject("Maths", &[(4, Absent), (2, Present), (4, Present)])],
        )
        .unwrap();
        assert_eq!(
            stored.subjects[0].history,
            vec![
                AttendanceRecord::new(date(1, 2), Present),
                AttendanceRecord::new(date(1, 4), Present),
            ]
        );
        let read = AttendanceRepo::get(&conn, &key, 1).unwrap().unwrap();
        assert_eq!(read.subjects[0].history, stored.subjects[0].history);
    }

    #[test]
    fn duplicate_subject_names_are_rejected() {
        let conn = setup();
        let err = AttendanceRepo::replace_subjects(
            &conn,
            &CourseKey::new("mca").unwrap(),
            1,
            vec![subject("Maths", &[]), subject("maths", &[])],
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::DuplicateSubject("maths".to_string()))
        );
    }

    #[test]
    fn blank_subject_names_are_rejected() {
        let conn = setup();
        let key = CourseKey::new("mca").unwrap();
        let err = AttendanceRepo::replace_subjects(
            &conn,
            &key,
            1,
            vec![subject("Maths", &[]), SubjectAttendance::new("   ", 75, None)],
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::BlankSubjectName)
        );
        assert!(AttendanceRepo::get(&conn, &key, 1).unwrap().is_none());
    }

    #[test]
    fn reset_keeps_document_and_other_subjects() {
        let conn = setup();
        let key = CourseKey::new("mca").unwrap();
        AttendanceRepo::replace_subjects(
            &conn,
            &key,
            2,
            vec![
                subject("Maths", &[(1, Present), (2, Absent)]),
                subject("Physics", &[(1, Present)]),
            ],
        )
        .unwrap();

        let reset = AttendanceRepo::reset_subject(&conn, &key, 2, "maths", date(1, 5)).unwrap();
        assert_eq!(reset.history.len(), 5);
        assert!(reset.history.iter().all(|r| r.status == NoClass));

        let doc = AttendanceRepo::get(&conn, &key, 2).unwrap().unwrap();
        assert_eq!(doc.subjects.len(), 2);
        assert_eq!(doc.subjects[0].history, reset.history);
        assert_eq!(doc.subjects[1].history.len(), 1);
    }

    #[test]
    fn reset_unknown_subject_fails() {
        let conn = setup();
        let key = CourseKey::new("mca").unwrap();
        let err = AttendanceRepo::reset_subject(&conn, &key, 2, "Maths", date(1, 5)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AttendanceError>(),
            Some(AttendanceError::SubjectNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_document() {
        let conn = setup();
        let key = CourseKey::new("mca").unwrap();
        AttendanceRepo::replace_subjects(&conn, &key, 1, vec![subject("Maths", &[(1, Present)])])
            .unwrap();

        assert!(AttendanceRepo::delete(&conn, &key, 1).unwrap());
        assert!(AttendanceRepo::get(&conn, &key, 1).unwrap().is_none());
        assert!(!AttendanceRepo::delete(&conn, &key, 1).unwrap());
        assert!(AttendanceRepo::list(&conn).unwrap().is_empty());
    }

    #[test]
    fn todo_toggle_persists_marks() {
        let conn = setup();
        let id = TodoRepo::add(&conn, " Submit lab record ").unwrap();

        let action = TodoRepo::toggle(&conn, id, date(3, 1), date(3, 2)).unwrap();
        assert_eq!(action, ToggleAction::Marked);
        let todo = TodoRepo::get(&conn, id).unwrap().unwrap();
        assert_eq!(todo.title, "Submit lab record");
        assert!(todo.is_done_on(date(3, 1)));

        let action = TodoRepo::toggle(&conn, id, date(3, 1), date(3, 2)).unwrap();
        assert_eq!(action, ToggleAction::Unmarked);
        assert!(TodoRepo::get(&conn, id).unwrap().unwrap().completed_dates.is_empty());
    }

    #[test]
    fn todo_toggle_rejects_future_date() {
        let conn = setup();
        let id = TodoRepo::add(&conn, "Revise").unwrap();
        let err = TodoRepo::toggle(&conn, id, date(3, 3), date(3, 2)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AttendanceError>(),
            Some(AttendanceError::InvalidDate { .. })
        ));
    }

    #[test]
    fn todo_remove_and_list() {
        let conn = setup();
        let first = TodoRepo::add(&conn, "One").unwrap();
        let second = TodoRepo::add(&conn, "Two").unwrap();
        TodoRepo::toggle(&conn, first, date(3, 1), date(3, 1)).unwrap();

        assert!(TodoRepo::remove(&conn, first).unwrap());
        assert!(!TodoRepo::remove(&conn, first).unwrap());
        let todos = TodoRepo::list(&conn).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, second);
    }
}
