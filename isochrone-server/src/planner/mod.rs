//! Reachability over the station graph.
//!
//! This module answers: "starting from these stations at these times, which
//! stations can I reach within the budget, and how soon?"
//!
//! The graph index is built once per loaded network and shared read-only by
//! every search; each search owns its own working state.

mod graph;
mod search;

pub use graph::Graph;
pub use search::{
    Reachability, ReachableStation, SearchStrategy, merge_min, reachable_from,
    reachable_per_start, reachable_within, to_reachable_stations,
};
