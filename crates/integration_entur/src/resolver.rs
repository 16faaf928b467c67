//! Stop name resolution
//!
//! Resolves free text into stop candidates. The structured GraphQL search is
//! always tried first; a transport failure or an upstream `errors` payload
//! degrades to the geocoder text search.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::client::EnturTransport;
use crate::error::{EnturError, TransportError};
use crate::models::StopCandidate;
use crate::queries::STOP_SEARCH_QUERY;

/// Resolves stop names to candidates using the structured and text search mechanisms
#[derive(Clone)]
pub struct StopResolver {
    transport: Arc<dyn EnturTransport>,
}

impl std::fmt::Debug for StopResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopResolver").finish_non_exhaustive()
    }
}

impl StopResolver {
    /// Create a resolver over the given transport
    #[must_use]
    pub fn new(transport: Arc<dyn EnturTransport>) -> Self {
        Self { transport }
    }

    /// Search stops by name, falling back to text search when the structured API fails
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EnturError::StopSearchFailed`] if the fallback path fails too.
    #[instrument(skip(self))]
    pub async fn search_stops(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<StopCandidate>, EnturError> {
        match self.search_structured(query, limit).await {
            Ok(stops) => {
                debug!(count = stops.len(), "Structured stop search succeeded");
                Ok(stops)
            },
            Err(e) if e.triggers_fallback() => {
                info!(error = %e, "Structured stop search failed, falling back to text search");
                self.search_text(query, limit).await
            },
            Err(e) => Err(stop_search_failed(query, e)),
        }
    }

    /// Search stops with the geocoder text search only
    ///
    /// # Errors
    ///
    /// Returns [`EnturError::StopSearchFailed`] if the text search fails.
    #[instrument(skip(self))]
    pub async fn search_text(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<StopCandidate>, EnturError> {
        self.transport
            .query_text_search(query, limit)
            .await
            .map_err(|e| stop_search_failed(query, e))
    }

    async fn search_structured(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<StopCandidate>, EnturError> {
        let data = self
            .transport
            .query_structured(STOP_SEARCH_QUERY, json!({ "query": query, "limit": limit }))
            .await?;

        parse_stop_places(data, limit)
    }
}

fn stop_search_failed(query: &str, source: EnturError) -> EnturError {
    EnturError::StopSearchFailed {
        query: query.to_string(),
        source: Box::new(source),
    }
}

/// Convert the `data` member of a stop search response into candidates
fn parse_stop_places(data: Value, limit: u32) -> Result<Vec<StopCandidate>, EnturError> {
    if data.is_null() {
        return Ok(Vec::new());
    }

    let raw: RawStopSearchData =
        serde_json::from_value(data).map_err(|e| TransportError::Decode(e.to_string()))?;

    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    Ok(raw
        .stop_places
        .unwrap_or_default()
        .into_iter()
        .take(limit)
        .map(convert_stop_place)
        .collect())
}

fn convert_stop_place(raw: RawStopPlace) -> StopCandidate {
    let candidate = StopCandidate::new(raw.id, raw.name.unwrap_or_default())
        .with_coords(raw.latitude.unwrap_or(0.0), raw.longitude.unwrap_or(0.0));

    match raw.transport_mode.and_then(RawTransportMode::into_label) {
        Some(mode) => candidate.with_transport_mode(mode),
        None => candidate,
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopSearchData {
    #[serde(default)]
    stop_places: Option<Vec<RawStopPlace>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopPlace {
    id: String,
    name: Option<String>,
    #[serde(default)]
    transport_mode: Option<RawTransportMode>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Journey Planner reports a stop's mode as a single value or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTransportMode {
    One(String),
    Many(Vec<String>),
}

impl RawTransportMode {
    fn into_label(self) -> Option<String> {
        match self {
            Self::One(mode) => Some(mode),
            Self::Many(modes) if modes.is_empty() => None,
            Self::Many(modes) => Some(modes.join(",")),
        }
    }
}
