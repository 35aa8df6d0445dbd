//! Time-windowed distance aggregates over the activity store
//!
//! Four independent read-only queries, each computed against an explicit
//! "now" so they can be pinned in tests. Presentation values are rounded to
//! 2 decimals and default to 0 when a window is empty.

pub mod calendar;

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::store::Database;
use crate::Result;

use calendar::{
    day_start_utc, iso_week_start, month_start_utc, previous_month, round2, start_of_day,
};

/// Current and previous calendar month distance totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub current_month: f64,
    pub previous_month: f64,
}

/// One ISO week's total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekTotal {
    /// Monday of the week, YYYY-MM-DD
    pub week_start: NaiveDate,
    pub total_km: f64,
}

/// Trailing 12 ISO weeks, ascending by week start
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub weeks: Vec<WeekTotal>,
}

/// A single summed distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceTotal {
    pub km: f64,
}

/// Distance sums for the current and previous calendar month
pub fn monthly_stats(db: &Database, now: DateTime<Utc>) -> Result<MonthlyStats> {
    let current = (now.year(), now.month());
    let previous = previous_month(now.year(), now.month());

    let rows = db.activities_since(month_start_utc(previous.0, previous.1))?;

    let mut current_km = 0.0;
    let mut previous_km = 0.0;
    for row in rows {
        let bucket = (row.start_time_utc.year(), row.start_time_utc.month());
        if bucket == current {
            current_km += row.distance_km;
        } else if bucket == previous {
            previous_km += row.distance_km;
        }
    }

    Ok(MonthlyStats {
        current_month: round2(current_km),
        previous_month: round2(previous_km),
    })
}

/// Per-week distance sums for the trailing 12 ISO weeks
pub fn weekly_stats(db: &Database, now: DateTime<Utc>) -> Result<WeeklyStats> {
    let cutoff = iso_week_start(now.date_naive() - Duration::weeks(12));
    let rows = db.activities_since(day_start_utc(cutoff))?;

    let mut by_week: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        let week = iso_week_start(row.start_time_utc.date_naive());
        *by_week.entry(week).or_insert(0.0) += row.distance_km;
    }

    Ok(WeeklyStats {
        weeks: by_week
            .into_iter()
            .map(|(week_start, total)| WeekTotal {
                week_start,
                total_km: round2(total),
            })
            .collect(),
    })
}

/// Distance over the last 7 calendar days including today
pub fn last_7_days(db: &Database, now: DateTime<Utc>) -> Result<DistanceTotal> {
    let start = start_of_day(now - Duration::days(6));
    let end = start_of_day(now) + Duration::days(1);
    Ok(DistanceTotal {
        km: round2(db.total_km_between(start, end)?),
    })
}

/// Distance since the start of the current ISO week (Monday)
pub fn current_week(db: &Database, now: DateTime<Utc>) -> Result<DistanceTotal> {
    let start = day_start_utc(iso_week_start(now.date_naive()));
    let end = start_of_day(now) + Duration::days(1);
    Ok(DistanceTotal {
        km: round2(db.total_km_between(start, end)?),
    })
}
