//! UTC calendar arithmetic for the aggregation windows
//!
//! All window boundaries are derived here so the edge cases (year rollover,
//! ISO week starts) live in one tested place instead of inline field math.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// Midnight UTC of the instant's calendar day
pub fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start_utc(t.date_naive())
}

/// Midnight UTC of the given date
pub fn day_start_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Midnight UTC of the first day of (year, month)
pub fn month_start_utc(year: i32, month: u32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    day_start_utc(date)
}

/// The (year, month) preceding the given one, rolling over at January
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month > 1 {
        (year, month - 1)
    } else {
        (year - 1, 12)
    }
}

/// Monday of the ISO week containing the given date
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Round to 2 decimal places (presentation precision for kilometers)
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
