//! HTTP transport for the Entur APIs
//!
//! Talks to the [Journey Planner v3](https://developer.entur.org/pages-journeyplanner-journeyplanner)
//! GraphQL endpoint and the [geocoder](https://developer.entur.org/pages-geocoder-intro)
//! autocomplete endpoint. Every request carries the `ET-Client-Name` header
//! and is bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::config::EnturConfig;
use crate::error::{EnturError, TransportError};
use crate::models::{STOP_PLACE_PREFIX, StopCandidate};

/// Header Entur uses to identify API consumers (`ET-Client-Name`)
pub const CLIENT_NAME_HEADER: &str = "et-client-name";

const VENUE_LAYER: &str = "venue";

/// Trait for the two upstream query mechanisms
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EnturTransport: Send + Sync {
    /// Run a GraphQL query and return its `data` member
    ///
    /// A response carrying an `errors` collection yields
    /// [`EnturError::UpstreamQuery`] with the first error message.
    async fn query_structured(&self, query: &str, variables: Value) -> Result<Value, EnturError>;

    /// Free-text stop search via the geocoder, venues only
    async fn query_text_search(
        &self,
        text: &str,
        limit: u32,
    ) -> Result<Vec<StopCandidate>, EnturError>;
}

/// reqwest-based transport for the public Entur endpoints
#[derive(Debug)]
pub struct HttpEnturTransport {
    client: Client,
    config: EnturConfig,
}

impl HttpEnturTransport {
    /// Create a new transport
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &EnturConfig) -> Result<Self, EnturError> {
        config.validate().map_err(EnturError::Configuration)?;

        let client_name = HeaderValue::from_str(&config.client_name)
            .map_err(|e| EnturError::Configuration(format!("client_name: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(CLIENT_NAME_HEADER), client_name);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn map_reqwest_error(&self, e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            TransportError::ConnectionFailed(e.to_string())
        }
    }

    /// Check the status and read the body of a response
    async fn read_body(&self, response: reqwest::Response) -> Result<String, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.map_reqwest_error(&e))
    }

    /// Parse a GraphQL response body into its `data` member
    fn parse_graphql_response(
        body: &str,
        query: &str,
        variables: &Value,
    ) -> Result<Value, EnturError> {
        let raw: RawGraphQlResponse =
            serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

        if let Some(errors) = raw.errors {
            let payload = Value::Array(errors);
            warn!(errors = %payload, query, variables = %variables, "GraphQL query returned errors");

            let message = payload
                .get(0)
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(EnturError::UpstreamQuery { message });
        }

        Ok(raw.data.unwrap_or(Value::Null))
    }

    /// Parse a geocoder feature collection into stop candidates
    fn parse_features(body: &str, limit: u32) -> Result<Vec<StopCandidate>, EnturError> {
        let raw: RawFeatureCollection =
            serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(raw
            .features
            .unwrap_or_default()
            .into_iter()
            .filter_map(Self::convert_feature)
            .take(limit)
            .collect())
    }

    /// Convert a venue feature with a stop place id, skipping anything else
    fn convert_feature(feature: RawFeature) -> Option<StopCandidate> {
        let RawProperties { layer, id, name } = feature.properties.unwrap_or_default();

        if layer.as_deref() != Some(VENUE_LAYER) {
            return None;
        }
        let id = id.filter(|id| id.starts_with(STOP_PLACE_PREFIX))?;

        // GeoJSON order is [lon, lat]
        let coordinates = feature
            .geometry
            .and_then(|g| g.coordinates)
            .unwrap_or_default();
        let longitude = coordinates.first().copied().unwrap_or(0.0);
        let latitude = coordinates.get(1).copied().unwrap_or(0.0);

        Some(StopCandidate::new(id, name.unwrap_or_default()).with_coords(latitude, longitude))
    }
}

#[async_trait]
impl EnturTransport for HttpEnturTransport {
    #[instrument(skip(self, query))]
    async fn query_structured(&self, query: &str, variables: Value) -> Result<Value, EnturError> {
        let body = json!({ "query": query, "variables": variables });

        debug!(url = %self.config.graphql_url, "Sending GraphQL query");

        let response = self
            .client
            .post(&self.config.graphql_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&e))?;

        let body = self.read_body(response).await?;
        Self::parse_graphql_response(&body, query, &variables)
    }

    #[instrument(skip(self))]
    async fn query_text_search(
        &self,
        text: &str,
        limit: u32,
    ) -> Result<Vec<StopCandidate>, EnturError> {
        let params = [
            ("text", text.to_string()),
            ("size", limit.to_string()),
            ("layers", VENUE_LAYER.to_string()),
            ("multiModal", "true".to_string()),
        ];

        debug!(url = %self.config.geocoder_url, "Searching stops by text");

        let response = self
            .client
            .get(&self.config.geocoder_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&e))?;

        let body = self.read_body(response).await?;
        let stops = Self::parse_features(&body, limit)?;

        debug!(count = stops.len(), "Text search candidates");
        Ok(stops)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawGraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    #[serde(default)]
    features: Option<Vec<RawFeature>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<RawProperties>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    layer: Option<String>,
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(default)]
    coordinates: Option<Vec<f64>>,
}
