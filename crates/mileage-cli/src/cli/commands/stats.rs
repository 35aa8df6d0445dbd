//! Mileage stats commands: thin wrappers that run one aggregation query
//! against the local database and print its JSON shape.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::config;
use crate::error::{MileageError, Result};
use crate::stats;
use crate::store::Database;

fn open_database(db: Option<PathBuf>) -> Result<Database> {
    let path = match db {
        Some(path) => path,
        None => config::default_db_path()?,
    };
    if !path.exists() {
        return Err(MileageError::config(format!(
            "No database at {}. Run 'mileage sync run' first.",
            path.display()
        )));
    }
    Database::open(&path)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Current and previous calendar month totals
pub async fn monthly(db: Option<PathBuf>) -> Result<()> {
    let database = open_database(db)?;
    print_json(&stats::monthly_stats(&database, Utc::now())?)
}

/// Trailing 12 ISO weeks
pub async fn weekly(db: Option<PathBuf>) -> Result<()> {
    let database = open_database(db)?;
    print_json(&stats::weekly_stats(&database, Utc::now())?)
}

/// Last 7 calendar days including today
pub async fn last_7_days(db: Option<PathBuf>) -> Result<()> {
    let database = open_database(db)?;
    print_json(&stats::last_7_days(&database, Utc::now())?)
}

/// Current ISO week to date
pub async fn current_week(db: Option<PathBuf>) -> Result<()> {
    let database = open_database(db)?;
    print_json(&stats::current_week(&database, Utc::now())?)
}
