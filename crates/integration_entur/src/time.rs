//! Timestamp normalization
//!
//! Converts Entur's ISO-8601 timestamps into local wall-clock strings and
//! computes signed delays between aimed and expected times.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Local, TimeZone};

use crate::error::EnturError;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// ISO-8601 shapes accepted beyond RFC 3339, after `Z` becomes `+00:00`
const ISO_8601_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Parse an ISO-8601 timestamp carrying `Z` or an explicit offset
///
/// Besides RFC 3339 this accepts minute precision (`2024-01-01T10:00Z`) and
/// basic offsets (`+0100`, `+01`). Timestamps without an offset are rejected.
///
/// # Errors
///
/// Returns [`EnturError::MalformedTimestamp`] if the input cannot be parsed.
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<FixedOffset>, EnturError> {
    DateTime::parse_from_rfc3339(timestamp)
        .or_else(|e| parse_iso_8601(timestamp).ok_or(e))
        .map_err(|e| EnturError::MalformedTimestamp(format!("{timestamp}: {e}")))
}

fn parse_iso_8601(timestamp: &str) -> Option<DateTime<FixedOffset>> {
    if timestamp.trim() != timestamp {
        return None;
    }

    let normalized = match timestamp.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => timestamp.to_string(),
    };

    ISO_8601_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
}

/// Format a timestamp as `HH:MM` in the host's local timezone
///
/// # Errors
///
/// Returns [`EnturError::MalformedTimestamp`] if the input cannot be parsed.
pub fn to_local_time(timestamp: &str) -> Result<String, EnturError> {
    to_time_in(timestamp, &Local)
}

/// Format a timestamp as `HH:MM` in the given timezone
///
/// # Errors
///
/// Returns [`EnturError::MalformedTimestamp`] if the input cannot be parsed.
pub fn to_time_in<Tz>(timestamp: &str, tz: &Tz) -> Result<String, EnturError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let parsed = parse_timestamp(timestamp)?;
    Ok(parsed.with_timezone(tz).format("%H:%M").to_string())
}

/// Signed delay in whole minutes, `expected - aimed`
///
/// Positive means later than scheduled. Half minutes round away from zero,
/// so `compute_delay_minutes(a, b) == -compute_delay_minutes(b, a)`.
///
/// # Errors
///
/// Returns [`EnturError::MalformedTimestamp`] if either input cannot be parsed.
pub fn compute_delay_minutes(expected: &str, aimed: &str) -> Result<i64, EnturError> {
    let expected = parse_timestamp(expected)?;
    let aimed = parse_timestamp(aimed)?;
    Ok(delay_between(&expected, &aimed))
}

/// Signed delay in whole minutes between two parsed timestamps
#[must_use]
pub fn delay_between(expected: &DateTime<FixedOffset>, aimed: &DateTime<FixedOffset>) -> i64 {
    let millis = (*expected - *aimed).num_milliseconds();
    let minutes = (millis.abs() + MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE;
    millis.signum() * minutes
}
