//! Journey Planner v3 GraphQL documents

/// Stop place search by name
///
/// Variables: `query: String!`, `limit: Int!`
pub const STOP_SEARCH_QUERY: &str = r"
query($query: String!, $limit: Int!) {
  stopPlaces(ids: [], name: $query, limit: $limit) {
    id
    name
    transportMode
    latitude
    longitude
  }
}
";

/// Upcoming estimated calls at a stop place
///
/// Variables: `id: String!`, `numberOfDepartures: Int!`
pub const DEPARTURES_QUERY: &str = r"
query($id: String!, $numberOfDepartures: Int!) {
  stopPlace(id: $id) {
    id
    name
    estimatedCalls(numberOfDepartures: $numberOfDepartures) {
      realtime
      aimedDepartureTime
      expectedDepartureTime
      destinationDisplay {
        frontText
      }
      serviceJourney {
        journeyPattern {
          line {
            id
            publicCode
            transportMode
          }
        }
      }
    }
  }
}
";
