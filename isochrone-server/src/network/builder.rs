//! Building the station graph from feed rows.
//!
//! Platforms collapse into their parent stations, every station learns which
//! routes call at it, and consecutive stop times of each trip become hop
//! observations. All observations of one `(from, to, route)` hop are reduced
//! to their median, giving one edge per hop.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::domain::{Edge, ServiceTime, Station, StationId, hop_seconds};
use crate::feed::{Feed, StopRow, StopTimeRow};

use super::Network;

/// Longest plausible hop between consecutive stations, in seconds.
pub const MAX_HOP_SECONDS: i64 = 3600;

/// A single observation dropped during the build.
///
/// These never abort the build; they are logged and counted in the
/// [`BuildReport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataQualityWarning {
    /// Hop time outside `0..=MAX_HOP_SECONDS` after midnight correction
    #[error("trip {trip_id}: implausible hop {from} -> {to} of {seconds}s")]
    ImplausibleHop {
        trip_id: String,
        from: StationId,
        to: StationId,
        seconds: i64,
    },

    /// A stop time names a stop that is not in the stops table
    #[error("trip {trip_id}: unknown stop {stop_id}")]
    UnknownStop { trip_id: String, stop_id: String },

    /// A stop time names a trip that is not in the trips table
    #[error("unknown trip {trip_id}")]
    UnknownTrip { trip_id: String },

    /// A platform declares a parent that is not a station row
    #[error("stop {stop_id}: parent {parent} is not a station")]
    UnknownParent { stop_id: String, parent: String },

    /// A stop that would become a station has no coordinates
    #[error("stop {stop_id}: missing coordinates")]
    MissingCoordinates { stop_id: String },

    /// A stop time carries a time that does not parse
    #[error("trip {trip_id} seq {stop_sequence}: bad time {value:?}")]
    BadTime {
        trip_id: String,
        stop_sequence: u32,
        value: String,
    },

    /// A hop endpoint has neither arrival nor departure time
    #[error("trip {trip_id} seq {stop_sequence}: no usable time")]
    MissingTime { trip_id: String, stop_sequence: u32 },
}

/// Counts from one network build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub stations: usize,
    pub edges: usize,
    pub stop_time_rows: usize,
    /// Hop observations that survived every filter.
    pub observations: usize,
    /// Hops between two platforms of the same station.
    pub intra_station_hops: usize,
    pub implausible_hops: usize,
    pub unknown_stops: usize,
    pub unknown_trips: usize,
    pub unknown_parents: usize,
    pub missing_coordinates: usize,
    pub bad_times: usize,
    pub missing_times: usize,
}

impl BuildReport {
    /// Total number of data-quality warnings raised.
    pub fn warnings(&self) -> usize {
        self.implausible_hops
            + self.unknown_stops
            + self.unknown_trips
            + self.unknown_parents
            + self.missing_coordinates
            + self.bad_times
            + self.missing_times
    }

    fn record(&mut self, warning: DataQualityWarning) {
        debug!(%warning, "Discarded observation");
        match warning {
            DataQualityWarning::ImplausibleHop { .. } => self.implausible_hops += 1,
            DataQualityWarning::UnknownStop { .. } => self.unknown_stops += 1,
            DataQualityWarning::UnknownTrip { .. } => self.unknown_trips += 1,
            DataQualityWarning::UnknownParent { .. } => self.unknown_parents += 1,
            DataQualityWarning::MissingCoordinates { .. } => self.missing_coordinates += 1,
            DataQualityWarning::BadTime { .. } => self.bad_times += 1,
            DataQualityWarning::MissingTime { .. } => self.missing_times += 1,
        }
    }
}

/// Key of one hop: (from station, to station, route id).
type HopKey = (StationId, StationId, String);

/// Build the network from parsed feed tables.
pub fn build_network(feed: &Feed) -> (Network, BuildReport) {
    let mut report = BuildReport {
        stop_time_rows: feed.stop_times.len(),
        ..BuildReport::default()
    };

    let (stations, parent_of) = resolve_parents(&feed.stops, &mut report);

    // trip -> route id, route id -> rider-facing name
    let route_of_trip: HashMap<&str, &str> = feed
        .trips
        .iter()
        .map(|t| (t.trip_id.as_str(), t.route_id.as_str()))
        .collect();
    let route_name: HashMap<&str, &str> = feed
        .routes
        .iter()
        .map(|r| (r.route_id.as_str(), r.display_name()))
        .collect();

    let routes_served = attribute_routes(feed, &parent_of, &route_of_trip, &route_name, &mut report);
    let observations = collect_hops(&feed.stop_times, &parent_of, &route_of_trip, &mut report);

    let stations: Vec<Station> = stations
        .into_values()
        .map(|mut station| {
            if let Some(routes) = routes_served.get(&station.id) {
                station.routes_served = routes.iter().cloned().collect();
            }
            station
        })
        .collect();

    let edges: Vec<Edge> = observations
        .into_iter()
        .filter_map(|((from_id, to_id, route_id), mut times)| {
            median_seconds(&mut times).map(|travel_time_sec| Edge {
                from_id,
                to_id,
                travel_time_sec,
                route_id,
            })
        })
        .collect();

    report.stations = stations.len();
    report.edges = edges.len();

    info!(
        stations = report.stations,
        edges = report.edges,
        observations = report.observations,
        "Built network"
    );
    if report.warnings() > 0 {
        warn!(
            warnings = report.warnings(),
            implausible = report.implausible_hops,
            unknown_stops = report.unknown_stops,
            unknown_trips = report.unknown_trips,
            unknown_parents = report.unknown_parents,
            missing_coordinates = report.missing_coordinates,
            bad_times = report.bad_times,
            missing_times = report.missing_times,
            "Discarded feed observations"
        );
    }

    (Network { stations, edges }, report)
}

/// Create stations and map every stop id to its station.
fn resolve_parents(
    stops: &[StopRow],
    report: &mut BuildReport,
) -> (BTreeMap<StationId, Station>, HashMap<String, StationId>) {
    let mut stations = BTreeMap::new();
    let mut parent_of = HashMap::new();

    // Parent stations first, so platforms can be checked against them
    for row in stops.iter().filter(|r| r.is_station()) {
        let Ok(id) = StationId::parse(&row.stop_id) else {
            continue;
        };
        let Some(station) = new_station(row, id.clone(), report) else {
            continue;
        };
        parent_of.insert(row.stop_id.trim().to_string(), id.clone());
        stations.insert(id, station);
    }

    for row in stops.iter().filter(|r| !r.is_station()) {
        let Ok(own_id) = StationId::parse(&row.stop_id) else {
            continue;
        };

        if let Some(parent) = row.parent() {
            if let Some((parent_id, _)) = stations.get_key_value(parent) {
                parent_of.insert(own_id.as_str().to_string(), parent_id.clone());
                continue;
            }
            report.record(DataQualityWarning::UnknownParent {
                stop_id: own_id.to_string(),
                parent: parent.to_string(),
            });
        }

        // Standalone stops and boardable orphans act as their own station
        if matches!(row.location_type, None | Some(0)) {
            if !stations.contains_key(&own_id) {
                let Some(station) = new_station(row, own_id.clone(), report) else {
                    continue;
                };
                stations.insert(own_id.clone(), station);
            }
            parent_of.insert(own_id.as_str().to_string(), own_id);
        }
    }

    (stations, parent_of)
}

/// A station for `row`, or `None` (with a warning) when it has no location.
fn new_station(row: &StopRow, id: StationId, report: &mut BuildReport) -> Option<Station> {
    let (Some(lat), Some(lon)) = (row.stop_lat, row.stop_lon) else {
        report.record(DataQualityWarning::MissingCoordinates {
            stop_id: id.to_string(),
        });
        return None;
    };
    Some(Station {
        id,
        name: row.stop_name.clone(),
        lat,
        lon,
        accessible: row.wheelchair_boarding == Some(1),
        routes_served: Vec::new(),
    })
}

/// Collect the set of route names calling at each station.
fn attribute_routes(
    feed: &Feed,
    parent_of: &HashMap<String, StationId>,
    route_of_trip: &HashMap<&str, &str>,
    route_name: &HashMap<&str, &str>,
    report: &mut BuildReport,
) -> HashMap<StationId, BTreeSet<String>> {
    let mut served: HashMap<StationId, BTreeSet<String>> = HashMap::new();

    for row in &feed.stop_times {
        let Some(station) = parent_of.get(row.stop_id.as_str()) else {
            report.record(DataQualityWarning::UnknownStop {
                trip_id: row.trip_id.clone(),
                stop_id: row.stop_id.clone(),
            });
            continue;
        };
        let Some(&route_id) = route_of_trip.get(row.trip_id.as_str()) else {
            report.record(DataQualityWarning::UnknownTrip {
                trip_id: row.trip_id.clone(),
            });
            continue;
        };
        let name = route_name.get(route_id).copied().unwrap_or(route_id);
        served
            .entry(station.clone())
            .or_default()
            .insert(name.to_string());
    }

    served
}

/// Turn consecutive stop times of each trip into hop observations.
fn collect_hops(
    stop_times: &[StopTimeRow],
    parent_of: &HashMap<String, StationId>,
    route_of_trip: &HashMap<&str, &str>,
    report: &mut BuildReport,
) -> BTreeMap<HopKey, Vec<u32>> {
    let mut by_trip: HashMap<&str, Vec<&StopTimeRow>> = HashMap::new();
    for row in stop_times {
        by_trip.entry(row.trip_id.as_str()).or_default().push(row);
    }

    // Ordered so edges come out sorted by (from, to, route)
    let mut observations: BTreeMap<HopKey, Vec<u32>> = BTreeMap::new();

    for (trip_id, mut rows) in by_trip {
        // Unknown trips were already reported during route attribution
        let Some(&route_id) = route_of_trip.get(trip_id) else {
            continue;
        };
        rows.sort_by_key(|r| r.stop_sequence);

        for pair in rows.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let (Some(from), Some(to)) = (
                parent_of.get(prev.stop_id.as_str()),
                parent_of.get(next.stop_id.as_str()),
            ) else {
                continue;
            };

            if from == to {
                report.intra_station_hops += 1;
                continue;
            }

            let departure = stop_time(prev, &prev.departure_time, &prev.arrival_time, report);
            let arrival = stop_time(next, &next.arrival_time, &next.departure_time, report);
            let (Some(departure), Some(arrival)) = (departure, arrival) else {
                continue;
            };

            let seconds = hop_seconds(departure, arrival);
            if !(0..=MAX_HOP_SECONDS).contains(&seconds) {
                report.record(DataQualityWarning::ImplausibleHop {
                    trip_id: trip_id.to_string(),
                    from: from.clone(),
                    to: to.clone(),
                    seconds,
                });
                continue;
            }

            report.observations += 1;
            observations
                .entry((from.clone(), to.clone(), route_id.to_string()))
                .or_default()
                .push(seconds as u32);
        }
    }

    observations
}

/// Pick the preferred time of a row, falling back to the other one.
fn stop_time(
    row: &StopTimeRow,
    preferred: &Option<String>,
    fallback: &Option<String>,
    report: &mut BuildReport,
) -> Option<ServiceTime> {
    for value in [preferred, fallback].into_iter().flatten() {
        if value.trim().is_empty() {
            continue;
        }
        match ServiceTime::parse(value) {
            Ok(time) => return Some(time),
            Err(_) => report.record(DataQualityWarning::BadTime {
                trip_id: row.trip_id.clone(),
                stop_sequence: row.stop_sequence,
                value: value.clone(),
            }),
        }
    }
    report.record(DataQualityWarning::MissingTime {
        trip_id: row.trip_id.clone(),
        stop_sequence: row.stop_sequence,
    });
    None
}

/// Median of the observed times, rounded to the nearest second.
///
/// Even-length inputs average the two middle values. Returns `None` for an
/// empty slice. The slice is sorted in place.
///
/// # Examples
///
/// ```
/// use isochrone_server::network::median_seconds;
///
/// assert_eq!(median_seconds(&mut [100, 300, 100]), Some(100));
/// assert_eq!(median_seconds(&mut [200, 100]), Some(150));
/// assert_eq!(median_seconds(&mut []), None);
/// ```
pub fn median_seconds(values: &mut [u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let mean = (f64::from(values[mid - 1]) + f64::from(values[mid])) / 2.0;
        Some(mean.round() as u32)
    }
}
