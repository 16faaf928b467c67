//! Departure lookup
//!
//! Fetches estimated calls for a stop place and normalizes them into
//! [`DepartureRecord`]s with local times and delays.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::client::EnturTransport;
use crate::error::{EnturError, TransportError};
use crate::models::{DepartureRecord, StopDepartures, StopId};
use crate::queries::DEPARTURES_QUERY;
use crate::resolver::StopResolver;

const UNKNOWN_STOP_NAME: &str = "Unknown stop";

/// Looks up upcoming departures by stop id or stop name
#[derive(Clone)]
pub struct DepartureBoard {
    transport: Arc<dyn EnturTransport>,
    resolver: StopResolver,
}

impl fmt::Debug for DepartureBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepartureBoard")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl DepartureBoard {
    /// Create a departure board over the given transport
    #[must_use]
    pub fn new(transport: Arc<dyn EnturTransport>) -> Self {
        let resolver = StopResolver::new(Arc::clone(&transport));
        Self {
            transport,
            resolver,
        }
    }

    /// The resolver used for name lookups
    #[must_use]
    pub const fn resolver(&self) -> &StopResolver {
        &self.resolver
    }

    /// Get the next `count` departures from a stop
    ///
    /// # Errors
    ///
    /// - [`EnturError::InvalidStopId`] before any request if `stop_id` is malformed
    /// - [`EnturError::DepartureQueryFailed`] if the API reports query errors
    /// - [`EnturError::StopNotFound`] if the API has no such stop
    /// - [`EnturError::Transport`] on network failures
    #[instrument(skip(self))]
    pub async fn get_departures(
        &self,
        stop_id: &str,
        count: u32,
    ) -> Result<StopDepartures, EnturError> {
        let stop_id = StopId::parse(stop_id)?;

        let data = self
            .transport
            .query_structured(
                DEPARTURES_QUERY,
                json!({ "id": stop_id.as_str(), "numberOfDepartures": count }),
            )
            .await
            .map_err(|e| match e {
                EnturError::UpstreamQuery { message } => EnturError::DepartureQueryFailed { message },
                other => other,
            })?;

        let stop = parse_stop_place(data)?
            .ok_or_else(|| EnturError::StopNotFound(stop_id.to_string()))?;

        let records = stop
            .estimated_calls
            .unwrap_or_default()
            .into_iter()
            .map(convert_call)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "Departures found");

        Ok(StopDepartures {
            stop_id,
            stop_name: stop.name.unwrap_or_else(|| UNKNOWN_STOP_NAME.to_string()),
            records,
        })
    }

    /// Resolve a stop name with text search and get departures for the best match
    ///
    /// # Errors
    ///
    /// - [`EnturError::StopSearchFailed`] if the text search fails
    /// - [`EnturError::NoMatchingStop`] if nothing matches `stop_name`
    /// - any error of [`Self::get_departures`]
    #[instrument(skip(self))]
    pub async fn find_and_get_departures(
        &self,
        stop_name: &str,
        count: u32,
    ) -> Result<StopDepartures, EnturError> {
        let stop = self
            .resolver
            .search_text(stop_name, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EnturError::NoMatchingStop(stop_name.to_string()))?;

        info!(stop_id = %stop.id, stop = %stop.name, "Resolved stop name");
        self.get_departures(&stop.id, count).await
    }
}

/// Extract the stop place from the `data` member, `None` when absent
fn parse_stop_place(data: Value) -> Result<Option<RawStopPlace>, EnturError> {
    if data.is_null() {
        return Ok(None);
    }

    let raw: RawDeparturesData =
        serde_json::from_value(data).map_err(|e| TransportError::Decode(e.to_string()))?;
    Ok(raw.stop_place)
}

fn convert_call(call: RawEstimatedCall) -> Result<DepartureRecord, EnturError> {
    let line = call.service_journey.journey_pattern.line;

    DepartureRecord::from_raw(
        line.public_code.unwrap_or_default(),
        call.destination_display
            .and_then(|d| d.front_text)
            .unwrap_or_default(),
        line.transport_mode.as_deref().unwrap_or("unknown"),
        &call.aimed_departure_time,
        &call.expected_departure_time,
        call.realtime,
    )
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeparturesData {
    #[serde(default)]
    stop_place: Option<RawStopPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopPlace {
    name: Option<String>,
    #[serde(default)]
    estimated_calls: Option<Vec<RawEstimatedCall>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEstimatedCall {
    #[serde(default)]
    realtime: bool,
    aimed_departure_time: String,
    expected_departure_time: String,
    destination_display: Option<RawDestinationDisplay>,
    service_journey: RawServiceJourney,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDestinationDisplay {
    front_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServiceJourney {
    journey_pattern: RawJourneyPattern,
}

#[derive(Debug, Deserialize)]
struct RawJourneyPattern {
    line: RawLine,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLine {
    public_code: Option<String>,
    transport_mode: Option<String>,
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::client::MockEnturTransport;
    use crate::models::{DelayStatus, StopCandidate};

    fn departures_data() -> Value {
        json!({
            "stopPlace": {
                "id": "NSR:StopPlace:58366",
                "name": "Jernbanetorget",
                "estimatedCalls": [
                    {
                        "realtime": true,
                        "aimedDepartureTime": "2024-01-01T10:00:00Z",
                        "expectedDepartureTime": "2024-01-01T10:05:00Z",
                        "destinationDisplay": { "frontText": "Oslo" },
                        "serviceJourney": {
                            "journeyPattern": {
                                "line": { "publicCode": "31", "transportMode": "bus" }
                            }
                        }
                    },
                    {
                        "realtime": false,
                        "aimedDepartureTime": "2024-01-01T10:10:00+01:00",
                        "expectedDepartureTime": "2024-01-01T10:08:00+01:00",
                        "destinationDisplay": { "frontText": "Bergkrystallen" },
                        "serviceJourney": {
                            "journeyPattern": {
                                "line": {
                                    "id": "RUT:Line:3",
                                    "publicCode": "3",
                                    "transportMode": "METRO"
                                }
                            }
                        }
                    }
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_get_departures_builds_records() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured()
            .withf(|query, variables| {
                query.contains("estimatedCalls")
                    && variables["id"] == "NSR:StopPlace:58366"
                    && variables["numberOfDepartures"] == 5
            })
            .times(1)
            .returning(|_, _| Ok(departures_data()));

        let board = DepartureBoard::new(Arc::new(mock));
        let result = board.get_departures("NSR:StopPlace:58366", 5).await.unwrap();

        assert_eq!(result.stop_name, "Jernbanetorget");
        assert_eq!(result.stop_id.as_str(), "NSR:StopPlace:58366");
        assert_eq!(result.records.len(), 2);

        let first = &result.records[0];
        assert_eq!(first.line_code, "31");
        assert_eq!(first.destination, "Oslo");
        assert_eq!(first.transport_mode, "bus");
        assert_eq!(first.delay_minutes, 5);
        assert!(first.is_realtime);

        let second = &result.records[1];
        assert_eq!(second.transport_mode, "metro");
        assert_eq!(second.delay_minutes, -2);
        assert_eq!(second.status(), DelayStatus::Early(2));
        assert!(!second.is_realtime);
    }

    #[tokio::test]
    async fn test_invalid_stop_id_makes_no_call() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured().times(0);
        mock.expect_query_text_search().times(0);

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.get_departures("XYZ", 5).await.unwrap_err();
        assert!(matches!(err, EnturError::InvalidStopId(ref id) if id == "XYZ"));
    }

    #[tokio::test]
    async fn test_upstream_error_is_departure_query_failed() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured().times(1).returning(|_, _| {
            Err(EnturError::UpstreamQuery {
                message: "Unknown stop place".to_string(),
            })
        });
        mock.expect_query_text_search().times(0);

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.get_departures("NSR:StopPlace:1", 5).await.unwrap_err();
        assert!(matches!(
            err,
            EnturError::DepartureQueryFailed { ref message } if message == "Unknown stop place"
        ));
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_directly() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured()
            .times(1)
            .returning(|_, _| Err(TransportError::Timeout { timeout_secs: 15 }.into()));

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.get_departures("NSR:StopPlace:1", 5).await.unwrap_err();
        assert!(matches!(
            err,
            EnturError::Transport(TransportError::Timeout { timeout_secs: 15 })
        ));
    }

    #[tokio::test]
    async fn test_missing_stop_is_not_found() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured()
            .times(1)
            .returning(|_, _| Ok(json!({ "stopPlace": null })));

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.get_departures("NSR:StopPlace:404", 5).await.unwrap_err();
        assert!(matches!(err, EnturError::StopNotFound(ref id) if id == "NSR:StopPlace:404"));
    }

    #[tokio::test]
    async fn test_stop_without_calls_or_name() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured()
            .times(1)
            .returning(|_, _| Ok(json!({ "stopPlace": { "id": "NSR:StopPlace:7" } })));

        let board = DepartureBoard::new(Arc::new(mock));
        let result = board.get_departures("NSR:StopPlace:7", 5).await.unwrap();
        assert_eq!(result.stop_name, UNKNOWN_STOP_NAME);
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_call_time() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_structured().times(1).returning(|_, _| {
            Ok(json!({
                "stopPlace": {
                    "name": "Somewhere",
                    "estimatedCalls": [{
                        "realtime": true,
                        "aimedDepartureTime": "10:00",
                        "expectedDepartureTime": "10:05",
                        "destinationDisplay": { "frontText": "Oslo" },
                        "serviceJourney": { "journeyPattern": { "line": { "publicCode": "1", "transportMode": "tram" } } }
                    }]
                }
            }))
        });

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.get_departures("NSR:StopPlace:7", 5).await.unwrap_err();
        assert!(matches!(err, EnturError::MalformedTimestamp(_)));
    }

    #[tokio::test]
    async fn test_find_and_get_uses_text_search_only() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_text_search()
            .with(eq("Jernbanetorget"), eq(1_u32))
            .times(1)
            .returning(|_, _| {
                Ok(vec![StopCandidate::new("NSR:StopPlace:58366", "Jernbanetorget")])
            });
        mock.expect_query_structured()
            .withf(|query, variables| {
                !query.contains("stopPlaces(") && variables["id"] == "NSR:StopPlace:58366"
            })
            .times(1)
            .returning(|_, _| Ok(departures_data()));

        let board = DepartureBoard::new(Arc::new(mock));
        let result = board
            .find_and_get_departures("Jernbanetorget", 5)
            .await
            .unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[tokio::test]
    async fn test_find_and_get_no_match() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_text_search()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        mock.expect_query_structured().times(0);

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.find_and_get_departures("Atlantis", 5).await.unwrap_err();
        assert!(matches!(err, EnturError::NoMatchingStop(ref name) if name == "Atlantis"));
    }

    #[tokio::test]
    async fn test_find_and_get_search_failure() {
        let mut mock = MockEnturTransport::new();
        mock.expect_query_text_search()
            .times(1)
            .returning(|_, _| Err(TransportError::HttpStatus { status: 500 }.into()));
        mock.expect_query_structured().times(0);

        let board = DepartureBoard::new(Arc::new(mock));
        let err = board.find_and_get_departures("Oslo", 5).await.unwrap_err();
        assert!(matches!(err, EnturError::StopSearchFailed { .. }));
    }
}
