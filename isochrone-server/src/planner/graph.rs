//! Adjacency index over the station network.
//!
//! Search asks one question over and over: "which edges leave station X?".
//! The index answers it with a single hash lookup. Every station of the
//! network has an entry, even when nothing leaves it, so an isolated station
//! and an unknown one both yield an empty slice.

use std::collections::HashMap;

use crate::domain::{Edge, StationId};
use crate::network::Network;

/// Outgoing edges per station. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<StationId, Vec<Edge>>,
    edge_count: usize,
}

impl Graph {
    /// Build the index in O(stations + edges).
    ///
    /// Edges keep their network order within each station's list.
    pub fn from_network(network: &Network) -> Self {
        let mut adjacency: HashMap<StationId, Vec<Edge>> =
            HashMap::with_capacity(network.stations.len());

        for station in &network.stations {
            adjacency.entry(station.id.clone()).or_default();
        }
        for edge in &network.edges {
            adjacency
                .entry(edge.from_id.clone())
                .or_default()
                .push(edge.clone());
        }

        Self {
            adjacency,
            edge_count: network.edges.len(),
        }
    }

    /// Edges leaving `station`. Empty for isolated and unknown stations.
    pub fn outgoing(&self, station: &str) -> &[Edge] {
        self.adjacency
            .get(station)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the number of indexed stations.
    pub fn station_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
