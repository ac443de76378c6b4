//! The station network: building it from a feed and persisting it.
//!
//! A [`Network`] is the artifact of the offline ingestion run. Everything
//! downstream treats it as a read-only snapshot.

mod builder;
mod error;
mod store;

use serde::{Deserialize, Serialize};

use crate::domain::{Edge, Station};

pub use builder::{BuildReport, DataQualityWarning, MAX_HOP_SECONDS, build_network, median_seconds};
pub use error::NetworkError;

/// Stations and the directed edges between them.
///
/// Array order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub stations: Vec<Station>,
    pub edges: Vec<Edge>,
}

impl Network {
    /// Look up a station by id.
    pub fn find_station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id.as_str() == id)
    }

    /// Returns the number of stations.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
