//! Fixed textual timestamp format.
//!
//! Every timestamp leaving the core is rendered as
//! `YYYY-MM-DDTHH:MM:SS.ffffffZ` (UTC, microsecond precision). Use this module
//! with `#[serde(with = "atelier_core::timestamp")]`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// `strftime` pattern for the wire format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Render a timestamp in the wire format.
///
/// ```
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
/// assert_eq!(atelier_core::timestamp::format(&ts), "2024-05-01T12:30:00.000000Z");
/// ```
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Drop sub-microsecond precision so values survive a format round trip.
pub fn truncate(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Serde serializer for the wire format.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

/// Serde deserializer accepting any RFC 3339 timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
