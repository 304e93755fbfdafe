use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::calc::Weighted;
use crate::models::{AttendanceStatus, CourseKey};
use crate::utils::dates::parse_day;

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, author, about = "A terminal companion for tracking class attendance against a goal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the subjects of a course semester
    Subject {
        #[command(subcommand)]
        action: SubjectCommands,
    },
    /// Record attendance for a subject on a day
    Mark {
        /// Course identifier (e.g. cs-101)
        course: CourseKey,
        semester: u8,
        subject: String,
        /// present, absent or no-class
        status: AttendanceStatus,
        /// Day to mark, defaults to today
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
    },
    /// Show attendance and goal projection for every subject
    Report {
        course: CourseKey,
        semester: u8,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Wipe a subject's marks, filling every day since its start with no-class
    Reset {
        course: CourseKey,
        semester: u8,
        subject: String,
    },
    /// Delete all attendance for a course semester
    Delete {
        course: CourseKey,
        semester: u8,
    },
    /// List tracked course semesters
    List,
    /// Replace a course semester's subjects from a JSON file
    Import {
        course: CourseKey,
        semester: u8,
        #[arg(long)]
        file: PathBuf,
    },
    /// Print a course semester as JSON
    Export {
        course: CourseKey,
        semester: u8,
    },
    /// To-do list with per-day completion
    Todo {
        #[command(subcommand)]
        action: TodoCommands,
    },
    /// Show configuration and storage locations
    Config {
        /// Write a config file with the current values if none exists
        #[arg(long)]
        init: bool,
    },
    /// Grade and score calculators
    Calc {
        #[command(subcommand)]
        action: CalcCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    /// Add a subject
    Add {
        course: CourseKey,
        semester: u8,
        name: String,
        /// Goal percentage (clamped to 1-100), defaults to the configured goal
        #[arg(long, allow_negative_numbers = true)]
        goal: Option<i64>,
        /// First day of tracking, defaults to today
        #[arg(long, value_parser = parse_day)]
        start: Option<NaiveDate>,
    },
    /// Remove a subject and its history
    Remove {
        course: CourseKey,
        semester: u8,
        name: String,
    },
    /// Change a subject's goal
    Goal {
        course: CourseKey,
        semester: u8,
        name: String,
        #[arg(allow_negative_numbers = true)]
        goal: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// Add a to-do item
    Add {
        title: String,
    },
    /// Show all to-do items and whether they are done today
    List,
    /// Mark or unmark an item for a day
    Toggle {
        id: i64,
        /// Day to toggle, defaults to today
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
    },
    /// Delete an item
    Remove {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum CalcCommands {
    /// Semester GPA from credits:grade pairs (grade as points or letter, e.g. 4:9 3:A+)
    Sgpa {
        #[arg(required = true)]
        courses: Vec<Weighted>,
    },
    /// Cumulative GPA from credits:sgpa pairs
    Cgpa {
        #[arg(required = true)]
        semesters: Vec<Weighted>,
    },
    /// Percentage of marks obtained
    Percent {
        obtained: f64,
        total: f64,
    },
}
