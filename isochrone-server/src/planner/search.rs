//! Budget-bounded reachability search.
//!
//! A Dijkstra search over the station graph that stops relaxing once a path
//! would exceed the time budget. The queue is a binary min-heap with lazy
//! deletion: improved stations are pushed again rather than updated in
//! place, and entries that no longer match the best known time are skipped
//! when popped.
//!
//! Finding nothing is a valid answer, not an error: the result is simply an
//! empty (or start-only) map.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::Serialize;
use tracing::trace;

use crate::domain::StationId;

use super::graph::Graph;

/// Best travel time in seconds per reachable station.
pub type Reachability = HashMap<StationId, u32>;

/// A station reachable within the budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachableStation {
    pub station_id: StationId,
    /// Minimum time from the origin, walking plus transit.
    pub travel_time_sec: u32,
}

/// How the walk-accessible start stations are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// One heap seeded with every start at its walk offset.
    #[default]
    MultiSource,
    /// One search per start, merged by minimum total afterwards.
    PerStart,
}

/// Search from a single start at time zero.
///
/// The start itself is always part of the result (at 0). Every other entry
/// is at most `budget_sec`.
pub fn reachable_from(graph: &Graph, start: &StationId, budget_sec: u32) -> Reachability {
    into_owned(dijkstra(graph, [(start, 0)], budget_sec))
}

/// Search from several starts, each entered at its own time offset.
///
/// Each `(station, offset)` pair says the station is reached `offset`
/// seconds after leaving the origin. Starts whose offset already exceeds
/// `max_time_sec` are ignored. The result holds the minimum total time per
/// station over all starts, every entry at most `max_time_sec`.
pub fn reachable_within(
    graph: &Graph,
    starts: &[(StationId, u32)],
    max_time_sec: u32,
) -> Reachability {
    let seeds = starts.iter().map(|(station, offset)| (station, *offset));
    into_owned(dijkstra(graph, seeds, max_time_sec))
}

/// Search each start separately and merge by minimum total time.
///
/// Produces the same map as [`reachable_within`], at the cost of one search
/// per start.
pub fn reachable_per_start(
    graph: &Graph,
    starts: &[(StationId, u32)],
    max_time_sec: u32,
) -> Reachability {
    let mut merged = Reachability::new();
    for (station, offset) in starts {
        let Some(remaining) = max_time_sec.checked_sub(*offset) else {
            continue;
        };
        let partial = reachable_from(graph, station, remaining);
        merge_min(&mut merged, *offset, partial);
    }
    merged
}

/// Merge a per-start result into `into`, shifting it by `offset` seconds.
///
/// Keeps the smaller total where both maps know a station.
pub fn merge_min(into: &mut Reachability, offset: u32, from: Reachability) {
    for (station, relative) in from {
        let total = offset.saturating_add(relative);
        into.entry(station)
            .and_modify(|best| *best = (*best).min(total))
            .or_insert(total);
    }
}

/// Flatten a result into stations ordered by travel time, then id.
pub fn to_reachable_stations(reach: Reachability) -> Vec<ReachableStation> {
    let mut stations: Vec<ReachableStation> = reach
        .into_iter()
        .map(|(station_id, travel_time_sec)| ReachableStation {
            station_id,
            travel_time_sec,
        })
        .collect();
    stations.sort_by(|a, b| {
        a.travel_time_sec
            .cmp(&b.travel_time_sec)
            .then_with(|| a.station_id.cmp(&b.station_id))
    });
    stations
}

/// Dijkstra from the given seeds, bounded by `budget`.
fn dijkstra<'a>(
    graph: &'a Graph,
    seeds: impl IntoIterator<Item = (&'a StationId, u32)>,
    budget: u32,
) -> HashMap<&'a StationId, u32> {
    let mut best: HashMap<&StationId, u32> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u32, &StationId)>> = BinaryHeap::new();

    for (station, time) in seeds {
        if time > budget {
            continue;
        }
        if best.get(station).is_none_or(|&known| time < known) {
            best.insert(station, time);
            heap.push(Reverse((time, station)));
        }
    }

    let mut pops = 0usize;
    while let Some(Reverse((time, station))) = heap.pop() {
        pops += 1;

        // Stale entry: the station was improved after this was pushed
        if best.get(station).is_some_and(|&known| time > known) {
            continue;
        }
        if time > budget {
            continue;
        }

        for edge in graph.outgoing(station.as_str()) {
            let candidate = time.saturating_add(edge.travel_time_sec);
            if candidate > budget {
                continue;
            }
            if best.get(&edge.to_id).is_none_or(|&known| candidate < known) {
                best.insert(&edge.to_id, candidate);
                heap.push(Reverse((candidate, &edge.to_id)));
            }
        }
    }

    trace!(reached = best.len(), pops, budget, "Reachability search complete");
    best
}

fn into_owned(reach: HashMap<&StationId, u32>) -> Reachability {
    reach
        .into_iter()
        .map(|(station, time)| (station.clone(), time))
        .collect()
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
