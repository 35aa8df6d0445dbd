//! Normalization of raw upstream payloads into `ActivityRecord`s
//!
//! Pure accept-or-reject transformation: no IO, no logging decisions. The
//! pipeline decides what to do with each `Skip`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::RawActivity;
use crate::store::ActivityRecord;

/// Activity type keys accepted by the pipeline
const RUNNING_TYPES: [&str; 3] = ["running", "treadmill_running", "track_running"];

/// Why a raw record was not turned into an `ActivityRecord`
#[derive(Debug, Clone, PartialEq)]
pub enum Skip {
    /// Payload did not decode into the expected shape
    Malformed(String),
    /// Activity type missing or not a running type
    NotRunning,
    /// Distance missing, zero, or negative
    NoDistance,
    /// Start timestamp missing
    MissingTimestamp,
    /// Start timestamp present but unparseable
    BadTimestamp(String),
}

/// Round to 3 decimal places (storage precision for kilometers)
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Parse an upstream `startTimeGMT` value into a UTC instant
///
/// Accepts RFC 3339 with a literal "Z" or an explicit offset, plus the
/// zone-less `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` forms the
/// activity list endpoint uses, which are GMT by definition.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(t.and_utc());
        }
    }
    None
}

/// Normalize one raw activity payload
pub fn normalize(payload: &Value) -> Result<ActivityRecord, Skip> {
    let raw: RawActivity =
        serde_json::from_value(payload.clone()).map_err(|e| Skip::Malformed(e.to_string()))?;

    let type_key = raw.type_key().ok_or(Skip::NotRunning)?;
    if !RUNNING_TYPES.contains(&type_key.as_str()) {
        return Err(Skip::NotRunning);
    }

    let distance_m = raw.distance.filter(|d| *d > 0.0).ok_or(Skip::NoDistance)?;

    let start_raw = raw.start_time_gmt.ok_or(Skip::MissingTimestamp)?;
    let start_time_utc =
        parse_start_time(&start_raw).ok_or_else(|| Skip::BadTimestamp(start_raw.clone()))?;

    Ok(ActivityRecord {
        external_id: raw.activity_id,
        start_time_utc,
        distance_km: round3(distance_m / 1000.0),
    })
}
