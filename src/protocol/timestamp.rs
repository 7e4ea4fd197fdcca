//! UTC timestamp formatting for the wire and the database.
//!
//! Every timestamp is RFC 3339 with whole seconds and a trailing `Z`,
//! e.g. `2026-02-13T15:00:00Z`.

use crate::LeasegateError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format an instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 timestamp with an explicit offset into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, LeasegateError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LeasegateError::ProtocolError(format!("Invalid timestamp {:?}: {}", value, e)))
}

/// Serde adapter: `#[serde(with = "crate::protocol::timestamp")]`.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

/// Serde adapter counterpart of [`serialize`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
