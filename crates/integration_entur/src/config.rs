//! Entur client configuration

use serde::{Deserialize, Serialize};
use url::Url;

/// Upper bound for stop search limits and departure counts
pub const MAX_RESULTS: u32 = 50;

/// Configuration for the Entur Journey Planner and geocoder endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnturConfig {
    /// Value of the `ET-Client-Name` header sent with every request
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Journey Planner GraphQL endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Geocoder autocomplete endpoint used for text search
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of stop candidates returned when no limit is given
    #[serde(default = "default_search_limit")]
    pub default_search_limit: u32,

    /// Number of departures returned when no count is given
    #[serde(default = "default_departures")]
    pub default_departures: u32,
}

fn default_client_name() -> String {
    "entur-departures".to_string()
}

fn default_graphql_url() -> String {
    "https://api.entur.io/journey-planner/v3/graphql".to_string()
}

fn default_geocoder_url() -> String {
    "https://api.entur.io/geocoder/v1/autocomplete".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_search_limit() -> u32 {
    5
}

const fn default_departures() -> u32 {
    5
}

impl Default for EnturConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            graphql_url: default_graphql_url(),
            geocoder_url: default_geocoder_url(),
            timeout_secs: default_timeout_secs(),
            default_search_limit: default_search_limit(),
            default_departures: default_departures(),
        }
    }
}

impl EnturConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            client_name: "entur-departures-test".to_string(),
            timeout_secs: 2,
            ..Default::default()
        }
    }

    /// Point both endpoints at a single base URL (mock servers, proxies)
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.graphql_url = format!("{base}/journey-planner/v3/graphql");
        self.geocoder_url = format!("{base}/geocoder/v1/autocomplete");
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_name.trim().is_empty() {
            return Err("client_name must not be empty".to_string());
        }

        validate_url("graphql_url", &self.graphql_url)?;
        validate_url("geocoder_url", &self.geocoder_url)?;

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        for (name, value) in [
            ("default_search_limit", self.default_search_limit),
            ("default_departures", self.default_departures),
        ] {
            if value == 0 {
                return Err(format!("{name} must be greater than 0"));
            }
            if value > MAX_RESULTS {
                return Err(format!("{name} must be {MAX_RESULTS} or less"));
            }
        }

        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{name} must use http or https, not {other}")),
    }
}
