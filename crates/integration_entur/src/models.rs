//! Entur data models
//!
//! Typed representations of stop candidates and departures, independent of
//! which upstream mechanism supplied them.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::EnturError;
use crate::time;

/// Prefix of every National Stop Register stop place id
pub const STOP_PLACE_PREFIX: &str = "NSR:StopPlace:";

/// A validated stop place identifier (`NSR:StopPlace:<digits>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopId(String);

impl StopId {
    /// Parse and validate a stop place identifier
    ///
    /// # Errors
    ///
    /// Returns [`EnturError::InvalidStopId`] if the id is not `NSR:StopPlace:<digits>`.
    pub fn parse(value: &str) -> Result<Self, EnturError> {
        let valid = value
            .strip_prefix(STOP_PLACE_PREFIX)
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));

        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(EnturError::InvalidStopId(value.to_string()))
        }
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopId {
    type Error = EnturError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StopId> for String {
    fn from(id: StopId) -> Self {
        id.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stop matching a free-text search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StopCandidate {
    /// Stop place id (`NSR:StopPlace:<digits>`)
    pub id: String,
    /// Human-readable stop name
    pub name: String,
    /// Transport mode(s) served, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
}

impl StopCandidate {
    /// Create a candidate without coordinates or mode
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            transport_mode: None,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// Create a candidate with coordinates
    #[must_use]
    pub const fn with_coords(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Create a candidate with a transport mode
    #[must_use]
    pub fn with_transport_mode(mut self, mode: impl Into<String>) -> Self {
        self.transport_mode = Some(mode.into());
        self
    }
}

impl fmt::Display for StopCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

/// Lateness of a departure relative to its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayStatus {
    /// Departing as scheduled
    OnTime,
    /// Departing this many minutes late
    Late(u64),
    /// Departing this many minutes early
    Early(u64),
}

impl DelayStatus {
    /// Classify a signed delay in minutes
    #[must_use]
    pub const fn from_minutes(delay_minutes: i64) -> Self {
        if delay_minutes > 0 {
            Self::Late(delay_minutes.unsigned_abs())
        } else if delay_minutes < 0 {
            Self::Early(delay_minutes.unsigned_abs())
        } else {
            Self::OnTime
        }
    }
}

impl fmt::Display for DelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTime => f.write_str("on time"),
            Self::Late(mins) => write!(f, "{mins} min late"),
            Self::Early(mins) => write!(f, "{mins} min early"),
        }
    }
}

/// A single upcoming departure from a stop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepartureRecord {
    /// Public line code (e.g., "31", "L2")
    pub line_code: String,
    /// Destination text shown on the vehicle
    pub destination: String,
    /// Transport mode, lower-cased (e.g., "bus", "rail")
    pub transport_mode: String,
    /// Scheduled departure time
    pub aimed_time: DateTime<FixedOffset>,
    /// Expected departure time (equals aimed when no realtime data)
    pub expected_time: DateTime<FixedOffset>,
    /// Whether `expected_time` comes from realtime data
    pub is_realtime: bool,
    /// Scheduled departure as local `HH:MM`
    pub local_aimed: String,
    /// Expected departure as local `HH:MM`
    pub local_expected: String,
    /// Signed delay in minutes, positive when late
    pub delay_minutes: i64,
}

impl DepartureRecord {
    /// Build a record from raw timestamps, deriving local times and delay
    ///
    /// # Errors
    ///
    /// Returns [`EnturError::MalformedTimestamp`] if either timestamp cannot be parsed.
    pub fn from_raw(
        line_code: impl Into<String>,
        destination: impl Into<String>,
        transport_mode: &str,
        aimed: &str,
        expected: &str,
        is_realtime: bool,
    ) -> Result<Self, EnturError> {
        let aimed_time = time::parse_timestamp(aimed)?;
        let expected_time = time::parse_timestamp(expected)?;

        Ok(Self {
            line_code: line_code.into(),
            destination: destination.into(),
            transport_mode: transport_mode.to_lowercase(),
            aimed_time,
            expected_time,
            is_realtime,
            local_aimed: time::to_local_time(aimed)?,
            local_expected: time::to_local_time(expected)?,
            delay_minutes: time::delay_between(&expected_time, &aimed_time),
        })
    }

    /// Lateness relative to the schedule
    #[must_use]
    pub const fn status(&self) -> DelayStatus {
        DelayStatus::from_minutes(self.delay_minutes)
    }
}

impl fmt::Display for DepartureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}): {} ({})",
            self.line_code,
            self.destination,
            self.transport_mode,
            self.local_expected,
            self.status()
        )
    }
}

/// Upcoming departures for one stop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StopDepartures {
    /// The queried stop
    pub stop_id: StopId,
    /// Stop name as reported by the provider
    pub stop_name: String,
    /// Departures in provider order
    pub records: Vec<DepartureRecord>,
}

impl StopDepartures {
    /// Whether there are no upcoming departures
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
