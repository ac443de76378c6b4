//! Walkshed polygons and their union.
//!
//! Around every reachable station the traveller can keep walking, so each
//! station contributes a circle. Circles are built on the sphere (each vertex
//! is a haversine destination from the centre) and then merged with planar
//! boolean union in lon/lat space.

use std::panic;

use geo::{BooleanOps, HaversineDestination, LineString, MultiPolygon, Point, Polygon};
use tracing::{debug, warn};

/// Approximate a circle of `radius_m` metres around `center`.
///
/// The exterior ring has `segments` distinct vertices (at least 3) placed at
/// equal bearings clockwise from north, and is closed.
pub fn walkshed(center: Point<f64>, radius_m: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(3);
    let step = 360.0 / segments as f64;

    let ring: Vec<_> = (0..segments)
        .map(|i| center.haversine_destination(step * i as f64, radius_m).0)
        .collect();

    Polygon::new(LineString::from(ring), vec![])
}

/// Union two multipolygons, turning a panic inside the boolean ops into `None`.
fn try_union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    panic::catch_unwind(panic::AssertUnwindSafe(|| a.union(b))).ok()
}

/// Merge all walksheds into one multipolygon.
///
/// Returns `None` for empty input or when any union step fails. A single
/// polygon is returned as-is without touching the boolean ops. Otherwise
/// unions run pairwise, level by level, which keeps intermediate shapes
/// small.
pub fn union_walksheds(polygons: Vec<Polygon<f64>>) -> Option<MultiPolygon<f64>> {
    match polygons.len() {
        0 => return None,
        1 => return Some(MultiPolygon::new(polygons)),
        _ => {}
    }

    let mut current: Vec<MultiPolygon<f64>> = polygons
        .into_iter()
        .map(|p| MultiPolygon::new(vec![p]))
        .collect();
    let mut level = 0usize;

    while current.len() > 1 {
        level += 1;
        let mut next = Vec::with_capacity(current.len().div_ceil(2));
        let mut pairs = current.chunks_exact(2);

        for pair in &mut pairs {
            match try_union(&pair[0], &pair[1]) {
                Some(merged) => next.push(merged),
                None => {
                    warn!(level, "Walkshed union panicked");
                    return None;
                }
            }
        }
        if let [odd] = pairs.remainder() {
            next.push(odd.clone());
        }

        debug!(level, parts = next.len(), "Walkshed union level complete");
        current = next;
    }

    current.pop().filter(|merged| !merged.0.is_empty())
}
