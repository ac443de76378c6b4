//! Walking access from an origin to nearby stations.
//!
//! An isochrone starts on foot: the traveller walks from the origin to a
//! station, then rides. This module finds the stations within walking range
//! of an origin and how long the walk takes, using great-circle distance and
//! a constant walking speed.

use geo::{HaversineDistance, Point};

use crate::domain::{Station, StationId};

/// Default walking speed in metres per second (about 5 km/h).
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.4;

/// A station reachable on foot from the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkAccess {
    pub station_id: StationId,
    /// Great-circle distance from the origin in metres.
    pub distance_m: f64,
    /// Walking time in whole seconds, rounded.
    pub walk_time_sec: u32,
}

/// Walking time for a distance at a constant speed, rounded to the second.
///
/// # Examples
///
/// ```
/// use isochrone_server::walkable::walking_time_sec;
///
/// assert_eq!(walking_time_sec(140.0, 1.4), 100);
/// assert_eq!(walking_time_sec(0.0, 1.4), 0);
/// ```
pub fn walking_time_sec(distance_m: f64, speed_mps: f64) -> u32 {
    if speed_mps <= 0.0 || !distance_m.is_finite() {
        return u32::MAX;
    }
    (distance_m / speed_mps).round().max(0.0) as u32
}

/// Stations within `limit_m` of `origin`, closest first.
///
/// A station further than the limit is never returned, however well
/// connected it is.
pub fn walk_accessible(
    origin: Point<f64>,
    stations: &[Station],
    limit_m: f64,
    speed_mps: f64,
) -> Vec<WalkAccess> {
    let mut nearby: Vec<WalkAccess> = stations
        .iter()
        .filter_map(|station| {
            let distance_m = origin.haversine_distance(&station.point());
            (distance_m <= limit_m).then(|| WalkAccess {
                station_id: station.id.clone(),
                distance_m,
                walk_time_sec: walking_time_sec(distance_m, speed_mps),
            })
        })
        .collect();

    nearby.sort_by(|a, b| {
        a.distance_m
            .total_cmp(&b.distance_m)
            .then_with(|| a.station_id.cmp(&b.station_id))
    });
    nearby
}
