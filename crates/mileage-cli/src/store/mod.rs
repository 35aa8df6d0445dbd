//! SQLite-backed activity store
//!
//! One table of deduplicated running activities keyed by the Garmin
//! activity id. Inserts are idempotent (`INSERT OR IGNORE`), so re-running
//! a sync against unchanged upstream data is a no-op.
//!
//! Start times are stored as RFC 3339 UTC strings with second precision,
//! which makes lexicographic range comparisons in SQL equivalent to
//! chronological ones.

mod schema;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::error::{MileageError, Result};

/// The canonical unit of ingested data
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// Garmin-assigned activity id; natural key for deduplication
    pub external_id: i64,
    /// Start instant, normalized to UTC, second precision
    pub start_time_utc: DateTime<Utc>,
    /// Distance in kilometers, > 0, rounded to 3 decimals
    pub distance_km: f64,
}

/// A stored activity row as read back for aggregation
#[derive(Debug, Clone)]
pub struct StoredActivity {
    pub start_time_utc: DateTime<Utc>,
    pub distance_km: f64,
}

/// Format an instant the way the store expects it
fn format_ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MileageError::database(format!("Bad timestamp '{}' in store: {}", s, e)))
}

/// SQLite database of running activities
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the activity database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| MileageError::database(format!("Failed to open database: {}", e)))?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MileageError::database(format!("Failed to open database: {}", e)))?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Insert records that are not already present, in one transaction
    ///
    /// Conflicting activity ids are silently skipped. Returns the number of
    /// rows actually inserted, which is lower than the input length whenever
    /// duplicates were suppressed.
    pub fn insert_new(&mut self, records: &[ActivityRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| MileageError::database(format!("Failed to begin transaction: {}", e)))?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO activities (activity_id, start_time_utc, distance_km)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| MileageError::database(format!("Failed to prepare insert: {}", e)))?;

            for record in records {
                inserted += stmt
                    .execute(params![
                        record.external_id,
                        format_ts(record.start_time_utc),
                        record.distance_km,
                    ])
                    .map_err(|e| {
                        MileageError::database(format!("Failed to insert activity: {}", e))
                    })?;
            }
        }

        tx.commit()
            .map_err(|e| MileageError::database(format!("Failed to commit: {}", e)))?;

        Ok(inserted)
    }

    /// All activities starting at or after `cutoff`, ascending by start time
    pub fn activities_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<StoredActivity>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT start_time_utc, distance_km FROM activities
                 WHERE start_time_utc >= ?1
                 ORDER BY start_time_utc",
            )
            .map_err(|e| MileageError::database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![format_ts(cutoff)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(|e| MileageError::database(format!("Failed to query activities: {}", e)))?;

        let mut out = Vec::new();
        for row in rows {
            let (ts, km) = row.map_err(|e| MileageError::database(e.to_string()))?;
            out.push(StoredActivity {
                start_time_utc: parse_ts(&ts)?,
                distance_km: km,
            });
        }
        Ok(out)
    }

    /// Summed distance over the half-open interval `[start, end)`
    pub fn total_km_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(distance_km), 0.0) FROM activities
                 WHERE start_time_utc >= ?1 AND start_time_utc < ?2",
                params![format_ts(start), format_ts(end)],
                |row| row.get(0),
            )
            .map_err(|e| MileageError::database(format!("Failed to sum distances: {}", e)))
    }

    /// Total number of stored activities
    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))
            .map_err(|e| MileageError::database(format!("Failed to count activities: {}", e)))
    }

    /// Start time of the most recent stored activity, if any
    pub fn latest_start_time(&self) -> Result<Option<DateTime<Utc>>> {
        let ts: Option<String> = self
            .conn
            .query_row("SELECT MAX(start_time_utc) FROM activities", [], |row| {
                row.get(0)
            })
            .map_err(|e| MileageError::database(format!("Failed to query latest: {}", e)))?;

        ts.as_deref().map(parse_ts).transpose()
    }
}
