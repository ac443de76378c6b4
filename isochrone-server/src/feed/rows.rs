//! Typed rows for the four feed tables.
//!
//! Only the columns the network builder needs are decoded; any other columns
//! in the files are ignored.

use serde::Deserialize;

/// A row of `stops.txt`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopRow {
    pub stop_id: String,
    /// May be blank on generic nodes and boarding areas.
    #[serde(default)]
    pub stop_name: String,
    /// Required only for rows that become stations.
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    /// 0 or empty = stop/platform, 1 = station, 2-4 = entrances, nodes, boarding areas.
    pub location_type: Option<u8>,
    pub parent_station: Option<String>,
    /// 1 = accessible, 2 = not accessible, 0 or empty = unknown.
    #[serde(default)]
    pub wheelchair_boarding: Option<u8>,
}

impl StopRow {
    /// Whether this row describes a parent station.
    pub fn is_station(&self) -> bool {
        self.location_type == Some(1)
    }

    /// The declared parent station id, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent_station
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A row of `stop_times.txt`.
///
/// Times are kept as raw strings; non-timepoint rows may leave them blank.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub stop_id: String,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub stop_sequence: u32,
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripRow {
    pub trip_id: String,
    pub route_id: String,
}

/// A row of `routes.txt`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteRow {
    pub route_id: String,
    pub route_short_name: Option<String>,
}

impl RouteRow {
    /// The rider-facing name: the short name, or the route id when blank.
    pub fn display_name(&self) -> &str {
        self.route_short_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.route_id)
    }
}
