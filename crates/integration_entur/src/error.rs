//! Entur error types

use thiserror::Error;

/// Network or HTTP level failures talking to an Entur endpoint
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the endpoint failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Endpoint answered with a non-2xx status
    #[error("HTTP {status}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
    },

    /// Response body was not the expected JSON shape
    #[error("Could not decode response: {0}")]
    Decode(String),
}

/// Errors that can occur during Entur operations
#[derive(Debug, Error)]
pub enum EnturError {
    /// A timestamp could not be parsed as ISO-8601
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    /// Network or HTTP failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The structured API answered with an `errors` collection
    #[error("Upstream query error: {message}")]
    UpstreamQuery {
        /// First error message reported by the API
        message: String,
    },

    /// Both stop search mechanisms failed
    #[error("Error searching for stops: {source}")]
    StopSearchFailed {
        /// The search text
        query: String,
        /// Failure of the text search path
        #[source]
        source: Box<EnturError>,
    },

    /// Stop id does not match `NSR:StopPlace:<digits>`
    #[error("Invalid stop ID format. Stop IDs should begin with 'NSR:StopPlace:' (got '{0}')")]
    InvalidStopId(String),

    /// The API returned no stop for the given id
    #[error("Stop with ID {0} not found")]
    StopNotFound(String),

    /// The departures query was rejected by the API
    #[error("Error getting departures: {message}")]
    DepartureQueryFailed {
        /// First error message reported by the API
        message: String,
    },

    /// A stop name matched no candidates
    #[error("No stops found matching '{0}'")]
    NoMatchingStop(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EnturError {
    /// Returns true if a failed structured stop search should degrade to text search
    #[must_use]
    pub const fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::UpstreamQuery { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_errors() {
        assert!(EnturError::Transport(TransportError::Timeout { timeout_secs: 15 }).triggers_fallback());
        assert!(
            EnturError::Transport(TransportError::HttpStatus { status: 502 }).triggers_fallback()
        );
        assert!(
            EnturError::UpstreamQuery {
                message: "Validation error".to_string()
            }
            .triggers_fallback()
        );
    }

    #[test]
    fn test_non_fallback_errors() {
        assert!(!EnturError::MalformedTimestamp("yesterday".to_string()).triggers_fallback());
        assert!(!EnturError::InvalidStopId("XYZ".to_string()).triggers_fallback());
        assert!(!EnturError::StopNotFound("NSR:StopPlace:1".to_string()).triggers_fallback());
        assert!(!EnturError::NoMatchingStop("Nowhere".to_string()).triggers_fallback());
        assert!(
            !EnturError::DepartureQueryFailed {
                message: "boom".to_string()
            }
            .triggers_fallback()
        );
    }

    #[test]
    fn test_error_display() {
        let err = EnturError::InvalidStopId("XYZ".to_string());
        assert!(err.to_string().contains("NSR:StopPlace:"));
        assert!(err.to_string().contains("XYZ"));

        let err = EnturError::StopNotFound("NSR:StopPlace:42".to_string());
        assert_eq!(err.to_string(), "Stop with ID NSR:StopPlace:42 not found");

        let err = EnturError::Transport(TransportError::Timeout { timeout_secs: 15 });
        assert!(err.to_string().contains("15"));
        assert!(err.triggers_fallback());

        let err = EnturError::NoMatchingStop("Atlantis".to_string());
        assert_eq!(err.to_string(), "No stops found matching 'Atlantis'");
    }

    #[test]
    fn test_stop_search_failed_keeps_source() {
        use std::error::Error as _;

        let err = EnturError::StopSearchFailed {
            query: "Oslo S".to_string(),
            source: Box::new(EnturError::Transport(TransportError::HttpStatus { status: 503 })),
        };
        assert!(err.to_string().contains("HTTP 503"));
        assert!(err.source().is_some());
    }
}
