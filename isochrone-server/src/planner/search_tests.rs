//! Unit tests for the reachability search.

use super::*;
use crate::domain::{Edge, Station};
use crate::network::Network;

fn id(s: &str) -> StationId {
    StationId::parse(s).unwrap()
}

fn station(s: &str) -> Station {
    Station {
        id: id(s),
        name: s.to_string(),
        lat: 0.0,
        lon: 0.0,
        accessible: false,
        routes_served: vec![],
    }
}

/// Build a graph from `(from, to, seconds)` triples on one route.
fn graph(stations: &[&str], edges: &[(&str, &str, u32)]) -> Graph {
    let network = Network {
        stations: stations.iter().map(|s| station(s)).collect(),
        edges: edges
            .iter()
            .map(|(from, to, secs)| Edge {
                from_id: id(from),
                to_id: id(to),
                travel_time_sec: *secs,
                route_id: "r".to_string(),
            })
            .collect(),
    };
    Graph::from_network(&network)
}

fn reach(pairs: &[(&str, u32)]) -> Reachability {
    pairs.iter().map(|(s, t)| (id(s), *t)).collect()
}

fn line() -> Graph {
    graph(&["A", "B", "C"], &[("A", "B", 60), ("B", "C", 120)])
}

#[test]
fn line_graph_within_budget() {
    let result = reachable_from(&line(), &id("A"), 200);
    assert_eq!(result, reach(&[("A", 0), ("B", 60), ("C", 180)]));
}

#[test]
fn line_graph_budget_excludes_far_station() {
    let result = reachable_from(&line(), &id("A"), 170);
    assert_eq!(result, reach(&[("A", 0), ("B", 60)]));
}

#[test]
fn budget_is_inclusive() {
    let result = reachable_from(&line(), &id("A"), 180);
    assert_eq!(result.get("C"), Some(&180));
}

#[test]
fn zero_budget_keeps_only_start() {
    let result = reachable_from(&line(), &id("A"), 0);
    assert_eq!(result, reach(&[("A", 0)]));
}

#[test]
fn edges_are_directed() {
    let result = reachable_from(&line(), &id("C"), 1000);
    assert_eq!(result, reach(&[("C", 0)]));
}

#[test]
fn isolated_and_unknown_starts() {
    let g = graph(&["A", "B", "Z"], &[("A", "B", 10)]);

    assert_eq!(reachable_from(&g, &id("Z"), 100), reach(&[("Z", 0)]));
    assert_eq!(reachable_from(&g, &id("Q"), 100), reach(&[("Q", 0)]));
}

#[test]
fn picks_shorter_of_two_paths() {
    // A -> C direct is slow, A -> B -> C is faster
    let g = graph(
        &["A", "B", "C"],
        &[("A", "C", 500), ("A", "B", 100), ("B", "C", 100)],
    );
    let result = reachable_from(&g, &id("A"), 1000);
    assert_eq!(result.get("C"), Some(&200));
}

#[test]
fn parallel_route_edges_take_fastest() {
    let g = graph(&["A", "B"], &[("A", "B", 300), ("A", "B", 120)]);
    let result = reachable_from(&g, &id("A"), 1000);
    assert_eq!(result.get("B"), Some(&120));
}

#[test]
fn stale_entries_do_not_overwrite_improvements() {
    // B is first pushed at 400 via A->B, then improved to 150 via A->D->B.
    // The stale 400 entry must not resurrect when popped later.
    let g = graph(
        &["A", "B", "C", "D"],
        &[("A", "B", 400), ("A", "D", 50), ("D", "B", 100), ("B", "C", 100)],
    );
    let result = reachable_from(&g, &id("A"), 1000);
    assert_eq!(result.get("B"), Some(&150));
    assert_eq!(result.get("C"), Some(&250));
}

#[test]
fn cycles_terminate() {
    let g = graph(
        &["A", "B", "C"],
        &[("A", "B", 10), ("B", "C", 10), ("C", "A", 10)],
    );
    let result = reachable_from(&g, &id("A"), 10_000);
    assert_eq!(result, reach(&[("A", 0), ("B", 10), ("C", 20)]));
}

#[test]
fn zero_weight_edges() {
    let g = graph(&["A", "B"], &[("A", "B", 0)]);
    let result = reachable_from(&g, &id("A"), 0);
    assert_eq!(result, reach(&[("A", 0), ("B", 0)]));
}

#[test]
fn multi_source_offsets_seed_the_search() {
    // Walk 300s to A or 50s to B; B's offset wins at C.
    let g = graph(&["A", "B", "C"], &[("A", "C", 100), ("B", "C", 400)]);
    let starts = vec![(id("A"), 300), (id("B"), 50)];

    let result = reachable_within(&g, &starts, 1000);
    assert_eq!(result, reach(&[("A", 300), ("B", 50), ("C", 400)]));
}

#[test]
fn multi_source_ignores_starts_over_budget() {
    let starts = vec![(id("A"), 500)];
    let result = reachable_within(&line(), &starts, 400);
    assert!(result.is_empty());
}

#[test]
fn multi_source_empty_starts() {
    let result = reachable_within(&line(), &[], 400);
    assert!(result.is_empty());
}

#[test]
fn multi_source_duplicate_start_keeps_minimum() {
    let starts = vec![(id("A"), 90), (id("A"), 30)];
    let result = reachable_within(&line(), &starts, 1000);
    assert_eq!(result.get("A"), Some(&30));
    assert_eq!(result.get("B"), Some(&90));
}

#[test]
fn per_start_matches_worked_example() {
    let g = graph(&["A", "B", "C"], &[("A", "C", 100), ("B", "C", 400)]);
    let starts = vec![(id("A"), 300), (id("B"), 50)];

    let result = reachable_per_start(&g, &starts, 1000);
    assert_eq!(result, reach(&[("A", 300), ("B", 50), ("C", 400)]));
}

#[test]
fn per_start_respects_remaining_budget() {
    // Walking 100s to A leaves 150s: B (60) fits, C (180) does not.
    let starts = vec![(id("A"), 100)];
    let result = reachable_per_start(&line(), &starts, 250);
    assert_eq!(result, reach(&[("A", 100), ("B", 160)]));
}

#[test]
fn merge_min_keeps_smaller_total() {
    let mut merged = reach(&[("A", 100), ("B", 500)]);
    merge_min(&mut merged, 50, reach(&[("B", 100), ("A", 100), ("C", 0)]));
    assert_eq!(merged, reach(&[("A", 100), ("B", 150), ("C", 50)]));
}

#[test]
fn reachable_stations_sorted_by_time_then_id() {
    let list = to_reachable_stations(reach(&[("C", 20), ("B", 10), ("A", 20)]));
    let ids: Vec<_> = list.iter().map(|r| r.station_id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A", "C"]);
    assert_eq!(list[0].travel_time_sec, 10);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    const NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

    fn arb_graph() -> impl Strategy<Value = Graph> {
        prop::collection::vec((0usize..8, 0usize..8, 0u32..600), 0..30).prop_map(|edges| {
            let triples: Vec<(&str, &str, u32)> = edges
                .into_iter()
                .map(|(f, t, s)| (NAMES[f], NAMES[t], s))
                .collect();
            graph(&NAMES, &triples)
        })
    }

    fn arb_starts() -> impl Strategy<Value = Vec<(StationId, u32)>> {
        prop::collection::vec((0usize..8, 0u32..900), 0..4).prop_map(|starts| {
            starts
                .into_iter()
                .map(|(s, offset)| (id(NAMES[s]), offset))
                .collect()
        })
    }

    proptest! {
        /// A larger budget never loses a station
        #[test]
        fn monotonic_in_budget(g in arb_graph(), small in 0u32..2000, extra in 0u32..2000) {
            let narrow = reachable_from(&g, &id("A"), small);
            let wide = reachable_from(&g, &id("A"), small + extra);
            for (station, time) in &narrow {
                prop_assert_eq!(wide.get(station), Some(time));
            }
        }

        /// Every reported time is within the budget
        #[test]
        fn within_budget(g in arb_graph(), starts in arb_starts(), max in 0u32..2000) {
            for time in reachable_within(&g, &starts, max).values() {
                prop_assert!(*time <= max);
            }
        }

        /// The seeded multi-source search equals per-start search plus merge
        #[test]
        fn multi_source_equals_per_start(g in arb_graph(), starts in arb_starts(), max in 0u32..2000) {
            prop_assert_eq!(
                reachable_within(&g, &starts, max),
                reachable_per_start(&g, &starts, max)
            );
        }

        /// No shortcut exists: every edge between two reached stations respects the distances
        #[test]
        fn distances_are_consistent(g in arb_graph(), max in 0u32..2000) {
            let result = reachable_from(&g, &id("A"), max);
            for (station, &from) in &result {
                for edge in g.outgoing(station.as_str()) {
                    let via = from + edge.travel_time_sec;
                    if via <= max {
                        let to = result.get(&edge.to_id).copied();
                        prop_assert!(to.is_some_and(|t| t <= via));
                    }
                }
            }
        }
    }
}
