//! Plain-text rendering of search and departure results

use crate::models::{DepartureRecord, StopCandidate, StopDepartures};

/// Format stop candidates as a bulleted list
#[must_use]
pub fn format_stop_list(query: &str, stops: &[StopCandidate]) -> String {
    if stops.is_empty() {
        return format!("No stops found matching '{query}'");
    }

    let mut lines = Vec::with_capacity(stops.len() + 1);
    lines.push(String::from("Found these stops:"));
    lines.extend(stops.iter().map(|stop| format!("• {stop}")));
    lines.join("\n")
}

/// Format upcoming departures for a stop
#[must_use]
pub fn format_departures(departures: &StopDepartures) -> String {
    if departures.is_empty() {
        return format!(
            "No departures found for {} in the near future",
            departures.stop_name
        );
    }

    let mut lines = Vec::with_capacity(departures.records.len() + 1);
    lines.push(format!("Departures from {}:", departures.stop_name));
    lines.extend(departures.records.iter().map(format_departure));
    lines.join("\n")
}

fn format_departure(record: &DepartureRecord) -> String {
    format!("• {record}")
}
