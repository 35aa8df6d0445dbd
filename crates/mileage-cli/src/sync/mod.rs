//! Sync pipeline: page through the Garmin activity list, normalize running
//! activities, and persist them idempotently.
//!
//! Failure isolation follows three tiers:
//! - login failure is fatal and surfaces to the caller,
//! - a page fetch failure ends pagination early but keeps what was already
//!   accumulated,
//! - a bad record is skipped without affecting its page.

pub mod normalize;
pub mod rate_limiter;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, error, info, warn};

use crate::client::{ConnectClient, Session};
use crate::store::{ActivityRecord, Database};
use crate::Result;

pub use normalize::{normalize, Skip};
pub use rate_limiter::RateLimiter;

/// Options controlling a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Activities starting before this instant are not persisted
    pub start_date: DateTime<Utc>,
    /// Page size for the activity list endpoint
    pub page_size: u32,
    /// Safety bound: stop paginating after this many pages even if the
    /// source never returns an empty page
    pub max_pages: u32,
    /// Courtesy delay between page fetches
    pub page_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            start_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            page_size: 100,
            max_pages: 200,
            page_delay: Duration::from_secs(1),
        }
    }
}

/// Summary of one sync run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    /// Pages fetched from the API
    pub pages: u32,
    /// Raw activities seen across all pages
    pub fetched: usize,
    /// Activities that passed normalization and the start-date bound
    pub accepted: usize,
    /// Rows actually inserted (duplicates excluded)
    pub inserted: usize,
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {} activities fetched, {} running activities, {} newly inserted",
            self.pages, self.fetched, self.accepted, self.inserted
        )
    }
}

/// Sync engine driving one sequential ingestion run
pub struct SyncEngine {
    client: ConnectClient,
    session: Session,
    db: Database,
    options: SyncOptions,
}

impl SyncEngine {
    /// Create a sync engine with default options
    pub fn new(client: ConnectClient, session: Session, db: Database) -> Self {
        Self::with_options(client, session, db, SyncOptions::default())
    }

    /// Create a sync engine with custom options
    pub fn with_options(
        client: ConnectClient,
        session: Session,
        db: Database,
        options: SyncOptions,
    ) -> Self {
        Self {
            client,
            session,
            db,
            options,
        }
    }

    /// Run the pipeline once: paginate, normalize, persist
    ///
    /// Returns the run summary. Whatever was accumulated before a page
    /// failure is still persisted.
    pub async fn run(&mut self) -> Result<SyncStats> {
        let mut limiter = RateLimiter::new(self.options.page_delay);
        let mut accepted: Vec<ActivityRecord> = Vec::new();
        let mut stats = SyncStats::default();

        loop {
            if stats.pages >= self.options.max_pages {
                warn!(
                    max_pages = self.options.max_pages,
                    "Reached page safety bound before the source ran out; stopping pagination"
                );
                break;
            }

            limiter.wait().await;

            let offset = stats.pages * self.options.page_size;
            let batch = match self
                .client
                .list_activities(&self.session, offset, self.options.page_size)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    error!(page = stats.pages + 1, error = %e, "Failed to fetch page; stopping pagination");
                    break;
                }
            };

            stats.pages += 1;
            if batch.is_empty() {
                break;
            }

            stats.fetched += batch.len();
            for payload in &batch {
                match normalize(payload) {
                    Ok(record) if record.start_time_utc >= self.options.start_date => {
                        accepted.push(record);
                    }
                    Ok(record) => {
                        debug!(
                            activity_id = record.external_id,
                            start = %record.start_time_utc,
                            "Skipping activity before start date"
                        );
                    }
                    Err(skip) => {
                        debug!(reason = ?skip, "Skipping activity");
                    }
                }
            }

            info!(page = stats.pages, count = batch.len(), "Fetched page");
        }

        stats.accepted = accepted.len();
        stats.inserted = self.db.insert_new(&accepted)?;
        info!(
            accepted = stats.accepted,
            inserted = stats.inserted,
            "Persisted sync results"
        );

        Ok(stats)
    }

    /// Access the underlying store after a run
    pub fn database(&self) -> &Database {
        &self.db
    }
}
