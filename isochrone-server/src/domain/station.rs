//! Station types.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A station identifier taken from the upstream feed.
///
/// Ids are the feed's own `stop_id` of the parent station, so rebuilding the
/// network from the same feed yields the same ids. Any `StationId` is
/// non-empty and carries no surrounding whitespace.
///
/// # Examples
///
/// ```
/// use isochrone_server::domain::StationId;
///
/// let id = StationId::parse("place-pktrm").unwrap();
/// assert_eq!(id.as_str(), "place-pktrm");
///
/// // Surrounding whitespace is trimmed
/// assert_eq!(StationId::parse("  place-dwnxg ").unwrap().as_str(), "place-dwnxg");
///
/// // Blank ids are rejected
/// assert!(StationId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }
        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl Borrow<str> for StationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parent station in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Step-free access, as declared by the feed. Missing data means `false`.
    pub accessible: bool,
    /// Short names of the routes calling here, sorted and deduplicated.
    pub routes_served: Vec<String>,
}

impl Station {
    /// Location as a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// A directed hop between two stations on one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from_id: StationId,
    pub to_id: StationId,
    /// Median observed traversal time, in seconds.
    pub travel_time_sec: u32,
    pub route_id: String,
}
