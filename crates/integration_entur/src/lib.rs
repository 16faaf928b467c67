//! Entur departure board integration
//!
//! Resolves stop names and fetches upcoming departures from
//! [Entur](https://developer.entur.org), the Norwegian national journey planner.
//!
//! # Architecture
//!
//! [`EnturTransport`] abstracts the two upstream query mechanisms: the
//! Journey Planner GraphQL API and the geocoder text search.
//! [`HttpEnturTransport`] implements it over reqwest. On top of it,
//! [`StopResolver`] turns free text into [`StopCandidate`]s, degrading from
//! GraphQL to text search when the former fails, and [`DepartureBoard`]
//! produces normalized [`DepartureRecord`]s with local times and delays.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use integration_entur::{DepartureBoard, EnturConfig, HttpEnturTransport, format_departures};
//!
//! let config = EnturConfig::default();
//! let transport = Arc::new(HttpEnturTransport::new(&config)?);
//! let board = DepartureBoard::new(transport);
//!
//! let departures = board.find_and_get_departures("Jernbanetorget", 5).await?;
//! println!("{}", format_departures(&departures));
//! ```

mod client;
mod config;
mod departures;
mod error;
mod format;
mod models;
mod queries;
mod resolver;
pub mod time;

pub use client::{CLIENT_NAME_HEADER, EnturTransport, HttpEnturTransport};
pub use config::{EnturConfig, MAX_RESULTS};
pub use departures::DepartureBoard;
pub use error::{EnturError, TransportError};
pub use format::{format_departures, format_stop_list};
pub use models::{
    DelayStatus, DepartureRecord, STOP_PLACE_PREFIX, StopCandidate, StopDepartures, StopId,
};
pub use queries::{DEPARTURES_QUERY, STOP_SEARCH_QUERY};
pub use resolver::StopResolver;
