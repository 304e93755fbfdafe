use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::attendance::{compute_goal_satisfaction, mark_day};
use crate::calc::{self, Weighted};
use crate::cli::args::{CalcCommands, SubjectCommands, TodoCommands};
use crate::config::AppConfig;
use crate::db::repository::{AttendanceRepo, MetaRepo, TodoRepo};
use crate::error::AttendanceError;
use crate::models::{
    AttendanceStatus, CourseKey, CourseSemesterAttendance, GoalReport, GoalStatus, ImportFile,
    SubjectAttendance, ToggleAction,
};
use crate::models::subject::clamp_goal;
use crate::utils::dates::format_day;
use crate::utils::format::{format_grade, format_percent, pad_display, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        let color: &str = $color;
        print!("{}", color);
        print!($($arg)*);
        if color.is_empty() {
            println!();
        } else {
            println!("\x1b[0m");
        }
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn paint(config: &AppConfig, color: &'static str) -> &'static str {
    if config.display.color { color } else { "" }
}

fn status_color(config: &AppConfig, report: &GoalReport) -> &'static str {
    let color = match report.status {
        GoalStatus::Neutral => DIM,
        GoalStatus::Danger => RED,
        GoalStatus::Safe
            if report.percentage < report.goal as u32 + config.tracking.warn_margin as u32 =>
        {
            AMBER
        }
        GoalStatus::Safe => GREEN,
    };
    paint(config, color)
}

fn load_doc(
    conn: &Connection,
    course: &CourseKey,
    semester: u8,
) -> Result<CourseSemesterAttendance> {
    AttendanceRepo::get(conn, course, semester)?
        .ok_or_else(|| anyhow!("No attendance recorded for {} semester {}", course, semester))
}

// ─── Subjects ────────────────────────────────────────────────────────────────

fn add_subject(
    conn: &Connection,
    course: &CourseKey,
    semester: u8,
    name: &str,
    goal: i64,
    start: Option<NaiveDate>,
) -> Result<SubjectAttendance> {
    let mut doc = AttendanceRepo::get(conn, course, semester)?
        .unwrap_or_else(|| CourseSemesterAttendance::new(course.clone(), semester));
    if doc.subject(name).is_some() {
        return Err(AttendanceError::DuplicateSubject(name.trim().to_string()).into());
    }
    let subject = SubjectAttendance::new(name, goal, start);
    doc.subjects.push(subject.clone());
    AttendanceRepo::replace_subjects(conn, course, semester, doc.subjects)?;
    Ok(subject)
}

fn remove_subject(conn: &Connection, course: &CourseKey, semester: u8, name: &str) -> Result<()> {
    let mut doc = load_doc(conn, course, semester)?;
    let wanted = name.trim().to_lowercase();
    let before = doc.subjects.len();
    doc.subjects.retain(|s| s.name.to_lowercase() != wanted);
    if doc.subjects.len() == before {
        return Err(AttendanceError::SubjectNotFound(name.to_string()).into());
    }
    AttendanceRepo::replace_subjects(conn, course, semester, doc.subjects)?;
    Ok(())
}

/// Returns the goal as stored, after clamping.
fn set_subject_goal(
    conn: &Connection,
    course: &CourseKey,
    semester: u8,
    name: &str,
    goal: i64,
) -> Result<u8> {
    let mut doc = load_doc(conn, course, semester)?;
    let subject = doc
        .subject_mut(name)
        .ok_or_else(|| AttendanceError::SubjectNotFound(name.to_string()))?;
    subject.goal = clamp_goal(goal);
    let goal = subject.goal;
    AttendanceRepo::replace_subjects(conn, course, semester, doc.subjects)?;
    Ok(goal)
}

pub fn handle_subject(
    conn: &Connection,
    config: &AppConfig,
    action: &SubjectCommands,
) -> Result<()> {
    match action {
        SubjectCommands::Add {
            course,
            semester,
            name,
            goal,
            start,
        } => {
            let goal = goal.unwrap_or(config.tracking.goal() as i64);
            let subject = add_subject(conn, course, *semester, name, goal, *start)?;
            println_colored!(
                paint(config, GREEN),
                "  ✓ Added {} to {} semester {} (goal {}%)",
                subject.name,
                course,
                semester,
                subject.goal
            );
        }
        SubjectCommands::Remove {
            course,
            semester,
            name,
        } => {
            remove_subject(conn, course, *semester, name)?;
            println_colored!(paint(config, AMBER), "  Removed {}", name.trim());
        }
        SubjectCommands::Goal {
            course,
            semester,
            name,
            goal,
        } => {
            let new_goal = set_subject_goal(conn, course, *semester, name, *goal)?;
            println_colored!(
                paint(config, GREEN),
                "  ✓ {} goal set to {}%",
                name.trim(),
                new_goal
            );
        }
    }
    Ok(())
}

// ─── Mark ────────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn handle_mark(
    conn: &Connection,
    config: &AppConfig,
    course: &CourseKey,
    semester: u8,
    subject_name: &str,
    status: AttendanceStatus,
    date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<()> {
    let date = date.unwrap_or(today);
    let mut doc = load_doc(conn, course, semester)?;
    let subject = doc
        .subject_mut(subject_name)
        .ok_or_else(|| AttendanceError::SubjectNotFound(subject_name.to_string()))?;
    subject.history = mark_day(&subject.history, date, status, today)?;
    let report = compute_goal_satisfaction(&subject.history, subject.goal as i64);
    let name = subject.name.clone();
    debug!("Marking {} {} on {}", name, status, date);

    AttendanceRepo::replace_subjects(conn, course, semester, doc.subjects)?;

    let color = match status {
        AttendanceStatus::Present => GREEN,
        AttendanceStatus::Absent => RED,
        AttendanceStatus::NoClass => DIM,
    };
    println_colored!(
        paint(config, color),
        "  ✓ {} marked {} for {}",
        name,
        status,
        format_day(date)
    );
    println_colored!(
        status_color(config, &report),
        "    {}/{} · {}% · {}",
        report.attended,
        report.total,
        report.percentage,
        report.message
    );
    Ok(())
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SubjectReport<'a> {
    subject: &'a str,
    #[serde(flatten)]
    report: GoalReport,
}

pub fn handle_report(
    conn: &Connection,
    config: &AppConfig,
    course: &CourseKey,
    semester: u8,
    json: bool,
) -> Result<()> {
    let doc = load_doc(conn, course, semester)?;
    let reports: Vec<SubjectReport> = doc
        .subjects
        .iter()
        .map(|s| SubjectReport {
            subject: &s.name,
            report: compute_goal_satisfaction(&s.history, s.goal as i64),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Serializing report")?
        );
        return Ok(());
    }

    println!();
    println_colored!(
        paint(config, GOLD),
        "  Attendance — {} · Semester {}",
        course,
        semester
    );
    println!();

    if reports.is_empty() {
        println_colored!(paint(config, DIM), "  No subjects yet. Add one with `rollcall subject add`.");
        println!();
        return Ok(());
    }

    let name_width = reports
        .iter()
        .map(|r| unicode_width::UnicodeWidthStr::width(r.subject))
        .max()
        .unwrap_or(0)
        .max(8);

    for entry in &reports {
        let r = &entry.report;
        let color = status_color(config, r);
        println_colored!(
            color,
            "  {}  {}  {:>3}/{:<3}  {:>3}%  goal {}%",
            pad_display(entry.subject, name_width),
            progress_bar(r.attended, r.total, config.display.bar_width),
            r.attended,
            r.total,
            r.percentage,
            r.goal
        );
        println_colored!(
            paint(config, DIM),
            "  {}  {}",
            pad_display("", name_width),
            r.message
        );
    }
    println!();
    Ok(())
}

// ─── Reset / delete / list ───────────────────────────────────────────────────

pub fn handle_reset(
    conn: &Connection,
    config: &AppConfig,
    course: &CourseKey,
    semester: u8,
    subject: &str,
    today: NaiveDate,
) -> Result<()> {
    let reset = AttendanceRepo::reset_subject(conn, course, semester, subject, today)?;
    println_colored!(
        paint(config, AMBER),
        "  {} reset: {} day(s) from {} marked no-class",
        reset.name,
        reset.history.len(),
        format_day(reset.effective_start(today))
    );
    Ok(())
}

pub fn handle_delete(
    conn: &Connection,
    config: &AppConfig,
    course: &CourseKey,
    semester: u8,
) -> Result<()> {
    if AttendanceRepo::delete(conn, course, semester)? {
        println_colored!(
            paint(config, AMBER),
            "  Deleted attendance for {} semester {}",
            course,
            semester
        );
    } else {
        println_colored!(
            paint(config, DIM),
            "  Nothing stored for {} semester {}",
            course,
            semester
        );
    }
    Ok(())
}

pub fn handle_list(conn: &Connection, config: &AppConfig) -> Result<()> {
    let docs = AttendanceRepo::list(conn)?;
    println!();
    if docs.is_empty() {
        println_colored!(paint(config, DIM), "  Nothing tracked yet");
        println!();
        return Ok(());
    }
    println_colored!(paint(config, GOLD), "  Tracked semesters");
    println!();
    for doc in &docs {
        println!(
            "  {}  sem {:<2}  {} subject(s)  updated {}",
            pad_display(doc.course.as_str(), 12),
            doc.semester,
            doc.subject_count,
            doc.updated_at
        );
    }
    println!();
    Ok(())
}

// ─── Import / export ─────────────────────────────────────────────────────────

/// Accepts either a subject list or the document printed by `export`.
fn import_subjects(
    conn: &Connection,
    course: &CourseKey,
    semester: u8,
    content: &str,
    default_goal: u8,
) -> Result<CourseSemesterAttendance> {
    let file: ImportFile = serde_json::from_str(content)?;
    AttendanceRepo::replace_subjects(conn, course, semester, file.into_subjects(default_goal))
}

fn export_json(conn: &Connection, course: &CourseKey, semester: u8) -> Result<String> {
    let doc = load_doc(conn, course, semester)?;
    serde_json::to_string_pretty(&doc).context("Serializing attendance")
}

pub fn handle_import(
    conn: &Connection,
    config: &AppConfig,
    course: &CourseKey,
    semester: u8,
    file: &Path,
) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Reading {:?}", file))?;
    let doc = import_subjects(conn, course, semester, &content, config.tracking.goal())
        .with_context(|| format!("Importing {:?}", file))?;
    info!("Imported {:?} into {} semester {}", file, course, semester);
    println_colored!(
        paint(config, GREEN),
        "  ✓ Replaced {} semester {} with {} subject(s)",
        course,
        semester,
        doc.subjects.len()
    );
    Ok(())
}

pub fn handle_export(conn: &Connection, course: &CourseKey, semester: u8) -> Result<()> {
    println!("{}", export_json(conn, course, semester)?);
    Ok(())
}

// ─── Todo ────────────────────────────────────────────────────────────────────

pub fn handle_todo(
    conn: &Connection,
    config: &AppConfig,
    action: &TodoCommands,
    today: NaiveDate,
) -> Result<()> {
    match action {
        TodoCommands::Add { title } => {
            let id = TodoRepo::add(conn, title)?;
            println_colored!(paint(config, GREEN), "  ✓ Added #{}: {}", id, title.trim());
        }
        TodoCommands::List => {
            let todos = TodoRepo::list(conn)?;
            println!();
            if todos.is_empty() {
                println_colored!(paint(config, GREEN), "  ✓ Nothing to do");
            } else {
                println_colored!(paint(config, GOLD), "  To-do");
                println!();
                for todo in &todos {
                    let mark = if todo.is_done_on(today) {
                        format!("{}✓{}", paint(config, GREEN), reset_code(config))
                    } else {
                        "○".to_string()
                    };
                    let last = todo
                        .completed_dates
                        .latest()
                        .map(|d| format!("last done {}", format_day(d)))
                        .unwrap_or_else(|| "never done".to_string());
                    println!("  #{:<3} {}  {}  {}{}{}", todo.id, mark, todo.title, paint(config, DIM), last, reset_code(config));
                }
            }
            println!();
        }
        TodoCommands::Toggle { id, date } => {
            let date = date.unwrap_or(today);
            match TodoRepo::toggle(conn, *id, date, today)? {
                ToggleAction::Marked => println_colored!(
                    paint(config, GREEN),
                    "  ✓ #{} done for {}",
                    id,
                    format_day(date)
                ),
                ToggleAction::Unmarked => println_colored!(
                    paint(config, DIM),
                    "  ○ #{} unmarked for {}",
                    id,
                    format_day(date)
                ),
            }
        }
        TodoCommands::Remove { id } => {
            if TodoRepo::remove(conn, *id)? {
                println_colored!(paint(config, AMBER), "  Removed #{}", id);
            } else {
                return Err(anyhow!("Todo #{} not found", id));
            }
        }
    }
    Ok(())
}

fn reset_code(config: &AppConfig) -> &'static str {
    if config.display.color { "\x1b[0m" } else { "" }
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(conn: &Connection, config: &AppConfig, init: bool) -> Result<()> {
    let config_path = AppConfig::config_path()?;
    if init {
        if config_path.exists() {
            println_colored!(paint(config, DIM), "  Config already exists, leaving it untouched");
        } else {
            config.save()?;
            println_colored!(paint(config, GREEN), "  ✓ Wrote {:?}", config_path);
        }
    }
    let schema = MetaRepo::get(conn, "schema_version")?.unwrap_or_else(|| "?".to_string());

    println!();
    println_colored!(paint(config, GOLD), "  rollcall configuration");
    println!();
    println!("  Config file:   {:?}", config_path);
    println!("  Database:      {:?} (schema v{})", AppConfig::db_path()?, schema);
    println!("  Default goal:  {}%", config.tracking.goal());
    println!("  Warn margin:   {} points", config.tracking.warn_margin);
    println!("  Color:         {}", config.display.color);
    println!("  Bar width:     {}", config.display.bar_width);
    println!();
    Ok(())
}

// ─── Calculators ─────────────────────────────────────────────────────────────

pub fn handle_calc(config: &AppConfig, action: &CalcCommands) -> Result<()> {
    match action {
        CalcCommands::Sgpa { courses } => {
            print_average(config, "SGPA", calc::sgpa(courses)?, courses);
        }
        CalcCommands::Cgpa { semesters } => {
            print_average(config, "CGPA", calc::cgpa(semesters)?, semesters);
        }
        CalcCommands::Percent { obtained, total } => {
            match calc::percentage(*obtained, *total)? {
                Some(p) => println_colored!(
                    paint(config, BOLD),
                    "  {} / {} = {}",
                    obtained,
                    total,
                    format_percent(p)
                ),
                None => println_colored!(paint(config, DIM), "  Total marks are zero"),
            }
        }
    }
    Ok(())
}

fn print_average(config: &AppConfig, label: &str, value: Option<f64>, entries: &[Weighted]) {
    let credits: f64 = entries.iter().map(|e| e.credits).sum();
    match value {
        Some(v) => println_colored!(
            paint(config, BOLD),
            "  {}: {}  ({} credits)",
            label,
            format_grade(v),
            credits
        ),
        None => println_colored!(paint(config, DIM), "  {}: no credits entered", label),
    }
}
