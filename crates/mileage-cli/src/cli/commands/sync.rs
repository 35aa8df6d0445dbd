//! Sync commands

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::client::ConnectClient;
use crate::config::{self, Credentials};
use crate::error::{MileageError, Result};
use crate::stats::calendar::day_start_utc;
use crate::store::Database;
use crate::sync::{SyncEngine, SyncOptions};

/// Garmin Connect domain
const CONNECT_DOMAIN: &str = "garmin.com";

fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => {
            let path = config::default_db_path()?;
            if let Some(parent) = path.parent() {
                config::ensure_dir(&parent.to_path_buf())?;
            }
            Ok(path)
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| MileageError::InvalidDateFormat(s.to_string()))
}

/// Run one sync pass against Garmin Connect
pub async fn run(db: Option<PathBuf>, from: Option<String>, max_pages: u32) -> Result<()> {
    let credentials = Credentials::from_env()?;

    let db_path = resolve_db_path(db)?;
    info!(db = %db_path.display(), "Using database");
    let database = Database::open(&db_path)?;

    let client = ConnectClient::new(CONNECT_DOMAIN);
    let session = client.login(&credentials).await?;
    info!("Logged in to Garmin Connect");

    let mut options = SyncOptions {
        max_pages,
        ..SyncOptions::default()
    };
    if let Some(s) = &from {
        options.start_date = day_start_utc(parse_date(s)?);
    }

    let mut engine = SyncEngine::with_options(client, session, database, options);
    let stats = engine.run().await?;
    println!("Sync complete: {}", stats);

    Ok(())
}

/// Show what the local database currently holds
pub async fn status(db: Option<PathBuf>) -> Result<()> {
    let db_path = resolve_db_path(db)?;

    if !db_path.exists() {
        println!("No database found at: {}", db_path.display());
        println!("Run 'mileage sync run' to create one.");
        return Ok(());
    }

    let database = Database::open(&db_path)?;
    println!("Database: {}", db_path.display());
    println!("Activities: {}", database.count()?);
    match database.latest_start_time()? {
        Some(latest) => println!("Latest activity: {}", latest),
        None => println!("Latest activity: -"),
    }

    Ok(())
}
