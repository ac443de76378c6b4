//! Isochrone synthesis: walk, ride, walk again.
//!
//! An isochrone is the area reachable from an origin within a travel-time
//! budget. It is assembled from three pieces: the stations within walking
//! range of the origin, the stations reachable from those by transit, and a
//! walkshed circle around every reached station. The union of the circles is
//! the answer.

mod config;
mod engine;
mod walkshed;

use std::fmt;
use std::sync::Arc;

use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};

use crate::planner::ReachableStation;

pub use config::IsochroneConfig;
pub use engine::IsochroneEngine;
pub use walkshed::{union_walksheds, walkshed};

/// Where the traveller starts, in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lon: f64,
}

impl Origin {
    /// Create an origin from latitude and longitude.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// The origin as a geo point (x = lon, y = lat).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// A computed isochrone.
#[derive(Debug, Clone, PartialEq)]
pub struct Isochrone {
    /// Union of the walksheds. Disjoint areas stay separate parts.
    pub polygon: MultiPolygon<f64>,
    /// Reached stations, ordered by travel time then id.
    pub reachable_stations: Vec<ReachableStation>,
    /// Number of reached stations.
    pub total_stations: usize,
}

/// Why no isochrone could be produced.
///
/// These are answers, not failures: a query far from any station simply has
/// no transit isochrone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResult {
    /// No station lies within the walking limit of the origin.
    NoStationInWalkRange,
    /// Stations are in walking range, but walking to any of them takes
    /// longer than the whole budget.
    BudgetTooSmall,
    /// The search reached no station with a known location.
    NothingReachable,
    /// The walksheds could not be merged.
    UnionFailed,
}

impl fmt::Display for NoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NoResult::NoStationInWalkRange => "no station within walking range",
            NoResult::BudgetTooSmall => "budget too small to walk to any station",
            NoResult::NothingReachable => "no station reachable",
            NoResult::UnionFailed => "walkshed union failed",
        };
        f.write_str(reason)
    }
}

/// Result of an isochrone query.
#[derive(Debug, Clone, PartialEq)]
pub enum IsochroneOutcome {
    Found(Arc<Isochrone>),
    NoResult(NoResult),
}

impl IsochroneOutcome {
    /// The isochrone, if one was found.
    pub fn found(&self) -> Option<&Arc<Isochrone>> {
        match self {
            IsochroneOutcome::Found(isochrone) => Some(isochrone),
            IsochroneOutcome::NoResult(_) => None,
        }
    }

    /// The reason, if nothing was found.
    pub fn no_result(&self) -> Option<NoResult> {
        match self {
            IsochroneOutcome::Found(_) => None,
            IsochroneOutcome::NoResult(reason) => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_point_is_lon_lat() {
        let point = Origin::new(42.36, -71.06).point();
        assert_eq!(point.x(), -71.06);
        assert_eq!(point.y(), 42.36);
    }

    #[test]
    fn no_result_serializes_snake_case() {
        let json = serde_json::to_string(&NoResult::NoStationInWalkRange).unwrap();
        assert_eq!(json, "\"no_station_in_walk_range\"");
        assert_eq!(
            serde_json::to_string(&NoResult::BudgetTooSmall).unwrap(),
            "\"budget_too_small\""
        );
    }

    #[test]
    fn no_result_display() {
        assert_eq!(NoResult::UnionFailed.to_string(), "walkshed union failed");
    }

    #[test]
    fn outcome_accessors() {
        let none = IsochroneOutcome::NoResult(NoResult::NothingReachable);
        assert!(none.found().is_none());
        assert_eq!(none.no_result(), Some(NoResult::NothingReachable));

        let found = IsochroneOutcome::Found(Arc::new(Isochrone {
            polygon: MultiPolygon::new(vec![]),
            reachable_stations: vec![],
            total_stations: 0,
        }));
        assert!(found.found().is_some());
        assert!(found.no_result().is_none());
    }
}
