use anyhow::Result;
use rusqlite::Connection;

use crate::db::repository::MetaRepo;

pub const SCHEMA_VERSION: &str = "1";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS attendance_docs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            course      TEXT NOT NULL,
            semester    INTEGER NOT NULL,
            updated_at  TEXT DEFAULT (datetime('now')),
            UNIQUE(course, semester)
        );

        CREATE TABLE IF NOT EXISTS subjects (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            doc_id      INTEGER NOT NULL REFERENCES attendance_docs(id),
            name        TEXT NOT NULL,
            goal        INTEGER NOT NULL CHECK(goal BETWEEN 1 AND 100),
            start_date  TEXT,
            position    INTEGER NOT NULL DEFAULT 0,
            UNIQUE(doc_id, name)
        );

        CREATE TABLE IF NOT EXISTS attendance_records (
            subject_id  INTEGER NOT NULL REFERENCES subjects(id),
            date        TEXT NOT NULL,
            status      TEXT NOT NULL CHECK(status IN ('present','absent','no-class')),
            PRIMARY KEY (subject_id, date)
        );

        CREATE TABLE IF NOT EXISTS todos (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS todo_completions (
            todo_id     INTEGER NOT NULL REFERENCES todos(id),
            date        TEXT NOT NULL,
            PRIMARY KEY (todo_id, date)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    MetaRepo::set(conn, "schema_version", SCHEMA_VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(
            MetaRepo::get(&conn, "schema_version").unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
    }

    #[test]
    fn status_check_rejects_unknown_values() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO attendance_records (subject_id, date, status) VALUES (1, '2024-01-01', 'late')",
            [],
        );
        assert!(result.is_err());
    }
}
