//! Activity payload models for the Garmin Connect activity list endpoint
//!
//! These structures mirror the JSON returned by the activity search API.
//! Only the fields the sync pipeline needs are decoded; everything else is
//! ignored.

use serde::{Deserialize, Serialize};

/// One activity as returned by the activity list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    /// Unique activity identifier assigned by Garmin
    pub activity_id: i64,

    /// Activity type; arrives either as a bare string or as an object
    /// carrying a `typeKey`
    #[serde(default)]
    pub activity_type: Option<ActivityTypeField>,

    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,

    /// Start time in GMT, ISO 8601 with optional trailing "Z" or the
    /// space-separated `YYYY-MM-DD HH:MM:SS` form. The upstream field name
    /// does not follow camelCase (trailing "GMT" is fully capitalized).
    #[serde(default, rename = "startTimeGMT")]
    pub start_time_gmt: Option<String>,
}

/// The two shapes the `activityType` field arrives in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityTypeField {
    Structured {
        #[serde(rename = "typeKey")]
        type_key: String,
    },
    Plain(String),
}

impl RawActivity {
    /// Lower-cased type key, or None when the field is missing or has an
    /// unrecognized shape
    pub fn type_key(&self) -> Option<String> {
        match &self.activity_type {
            Some(ActivityTypeField::Plain(s)) => Some(s.to_lowercase()),
            Some(ActivityTypeField::Structured { type_key }) => Some(type_key.to_lowercase()),
            None => None,
        }
    }
}
