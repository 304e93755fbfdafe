mod attendance;
mod calc;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    match cli.command {
        // Calculators need no storage
        Commands::Calc { action } => handlers::handle_calc(&config, &action),
        command => run_with_storage(&config, command),
    }
}

fn open_database() -> Result<Connection> {
    let db_path = AppConfig::db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating data directory {:?}", parent))?;
    }
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    log::debug!("Using database {:?}", db_path);

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;
    Ok(conn)
}

fn run_with_storage(config: &AppConfig, command: Commands) -> Result<()> {
    let conn = open_database()?;
    let today = Local::now().date_naive();

    match command {
        Commands::Subject { action } => {
            handlers::handle_subject(&conn, config, &action)?;
        }
        Commands::Mark {
            course,
            semester,
            subject,
            status,
            date,
        } => {
            handlers::handle_mark(&conn, config, &course, semester, &subject, status, date, today)?;
        }
        Commands::Report {
            course,
            semester,
            json,
        } => {
            handlers::handle_report(&conn, config, &course, semester, json)?;
        }
        Commands::Reset {
            course,
            semester,
            subject,
        } => {
            handlers::handle_reset(&conn, config, &course, semester, &subject, today)?;
        }
        Commands::Delete { course, semester } => {
            handlers::handle_delete(&conn, config, &course, semester)?;
        }
        Commands::List => {
            handlers::handle_list(&conn, config)?;
        }
        Commands::Import {
            course,
            semester,
            file,
        } => {
            handlers::handle_import(&conn, config, &course, semester, &file)?;
        }
        Commands::Export { course, semester } => {
            handlers::handle_export(&conn, &course, semester)?;
        }
        Commands::Todo { action } => {
            handlers::handle_todo(&conn, config, &action, today)?;
        }
        Commands::Config { init } => {
            handlers::handle_config(&conn, config, init)?;
        }
        Commands::Calc { action } => {
            handlers::handle_calc(config, &action)?;
        }
    }

    Ok(())
}
