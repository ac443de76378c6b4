//! The query engine: network, graph index and cache behind one entry point.

use std::collections::HashMap;
use std::sync::Arc;

use geo::Point;
use tracing::debug;

use crate::cache::{CacheStats, IsochroneCache};
use crate::domain::StationId;
use crate::network::Network;
use crate::planner::{
    Graph, SearchStrategy, reachable_per_start, reachable_within, to_reachable_stations,
};
use crate::walkable::walk_accessible;

use super::config::IsochroneConfig;
use super::walkshed::{union_walksheds, walkshed};
use super::{Isochrone, IsochroneOutcome, NoResult, Origin};

/// Answers isochrone queries against one immutable network.
///
/// Cheap to share behind an `Arc`; the cache does its own locking.
pub struct IsochroneEngine {
    network: Arc<Network>,
    graph: Arc<Graph>,
    locations: HashMap<StationId, Point<f64>>,
    config: IsochroneConfig,
    cache: IsochroneCache,
}

impl IsochroneEngine {
    /// Index `network` and wrap it with the given configuration and cache.
    pub fn new(network: Arc<Network>, config: IsochroneConfig, cache: IsochroneCache) -> Self {
        let graph = Arc::new(Graph::from_network(&network));
        let locations = network
            .stations
            .iter()
            .map(|s| (s.id.clone(), s.point()))
            .collect();

        Self {
            network,
            graph,
            locations,
            config,
            cache,
        }
    }

    /// The isochrone for `origin` within `max_travel_time_sec`, walking at
    /// most `walk_distance_limit_m` to the first station and after the last.
    ///
    /// Served from the cache when a nearby origin with a similar budget and
    /// the same walking limit was asked before. The result is computed with
    /// the budget of the cache key, so every request in a bucket sees the
    /// same isochrone.
    pub fn compute_isochrone(
        &self,
        origin: Origin,
        max_travel_time_sec: u32,
        walk_distance_limit_m: f64,
    ) -> IsochroneOutcome {
        let key = self
            .cache
            .key(origin, max_travel_time_sec, walk_distance_limit_m);
        self.cache.get_or_compute(key, || {
            self.synthesize(origin, key.budget_sec(), walk_distance_limit_m)
        })
    }

    /// Compute without consulting or filling the cache.
    pub fn synthesize(
        &self,
        origin: Origin,
        max_travel_time_sec: u32,
        walk_distance_limit_m: f64,
    ) -> IsochroneOutcome {
        let nearby = walk_accessible(
            origin.point(),
            &self.network.stations,
            walk_distance_limit_m,
            self.config.walking_speed_mps,
        );
        if nearby.is_empty() {
            debug!(
                lat = origin.lat,
                lon = origin.lon,
                walk_distance_limit_m,
                "No station within walking range"
            );
            return IsochroneOutcome::NoResult(NoResult::NoStationInWalkRange);
        }

        let starts: Vec<(StationId, u32)> = nearby
            .into_iter()
            .filter(|w| w.walk_time_sec <= max_travel_time_sec)
            .map(|w| (w.station_id, w.walk_time_sec))
            .collect();
        if starts.is_empty() {
            debug!(max_travel_time_sec, "Budget too small to reach any station");
            return IsochroneOutcome::NoResult(NoResult::BudgetTooSmall);
        }

        let reach = match self.config.strategy {
            SearchStrategy::MultiSource => {
                reachable_within(&self.graph, &starts, max_travel_time_sec)
            }
            SearchStrategy::PerStart => {
                reachable_per_start(&self.graph, &starts, max_travel_time_sec)
            }
        };
        let mut reachable_stations = to_reachable_stations(reach);
        // Edges may name stations the network has no location for
        reachable_stations.retain(|r| self.locations.contains_key(&r.station_id));

        let circles: Vec<_> = reachable_stations
            .iter()
            .filter_map(|r| self.locations.get(&r.station_id))
            .map(|center| {
                walkshed(
                    *center,
                    walk_distance_limit_m,
                    self.config.circle_segments,
                )
            })
            .collect();
        if circles.is_empty() {
            return IsochroneOutcome::NoResult(NoResult::NothingReachable);
        }

        let Some(polygon) = union_walksheds(circles) else {
            return IsochroneOutcome::NoResult(NoResult::UnionFailed);
        };

        debug!(
            starts = starts.len(),
            reached = reachable_stations.len(),
            parts = polygon.0.len(),
            max_travel_time_sec,
            "Isochrone synthesized"
        );

        let total_stations = reachable_stations.len();
        IsochroneOutcome::Found(Arc::new(Isochrone {
            polygon,
            reachable_stations,
            total_stations,
        }))
    }

    /// The network being queried.
    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    /// The adjacency index over the network.
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// The engine configuration.
    pub fn config(&self) -> &IsochroneConfig {
        &self.config
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
