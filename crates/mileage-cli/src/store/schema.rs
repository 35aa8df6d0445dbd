//! Database schema and migrations

use rusqlite::Connection;

use crate::error::{MileageError, Result};

/// Run all pending migrations
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .map_err(|e| MileageError::database(e.to_string()))?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migration_v1(conn)?;
    }

    Ok(())
}

/// Migration v1: activities table keyed by the Garmin activity id
fn migration_v1(conn: &Connection) -> Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS activities (
            activity_id INTEGER PRIMARY KEY,
            start_time_utc TEXT NOT NULL,
            distance_km REAL NOT NULL,
            synced_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        "CREATE INDEX IF NOT EXISTS idx_activities_start_time ON activities(start_time_utc)",
        "INSERT INTO schema_migrations (version) VALUES (1)",
    ];

    for sql in statements {
        conn.execute(sql, [])
            .map_err(|e| MileageError::database(format!("migration v1: {}", e)))?;
    }

    Ok(())
}
