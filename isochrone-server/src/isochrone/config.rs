//! Configuration for isochrone synthesis.

use crate::planner::SearchStrategy;
use crate::walkable::DEFAULT_WALKING_SPEED_MPS;

/// Configuration parameters for isochrone synthesis.
#[derive(Debug, Clone)]
pub struct IsochroneConfig {
    /// Walking speed in metres per second.
    /// Used both for the walk to the first station and for walksheds.
    pub walking_speed_mps: f64,

    /// Walk distance used when a request does not give one (metres).
    pub default_walk_distance_m: f64,

    /// Largest walk distance a request may ask for (metres).
    pub max_walk_distance_m: f64,

    /// Largest travel-time budget a request may ask for (minutes).
    pub max_budget_mins: u32,

    /// Number of vertices used to approximate each walkshed circle.
    pub circle_segments: usize,

    /// How walk-accessible start stations are searched.
    pub strategy: SearchStrategy,
}

impl IsochroneConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        walking_speed_mps: f64,
        default_walk_distance_m: f64,
        max_walk_distance_m: f64,
        max_budget_mins: u32,
        circle_segments: usize,
        strategy: SearchStrategy,
    ) -> Self {
        Self {
            walking_speed_mps,
            default_walk_distance_m,
            max_walk_distance_m,
            max_budget_mins,
            circle_segments,
            strategy,
        }
    }
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            default_walk_distance_m: 800.0,
            max_walk_distance_m: 5_000.0,
            max_budget_mins: 240, // 4 hours
            circle_segments: 32,
            strategy: SearchStrategy::MultiSource,
        }
    }
}
