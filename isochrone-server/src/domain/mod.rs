//! Domain types for the isochrone engine.
//!
//! Validated identifiers, the station and edge records that make up a
//! network, and service-day clock arithmetic. Types enforce their invariants
//! at construction time.

mod station;
mod time;

pub use station::{Edge, InvalidStationId, Station, StationId};
pub use time::{SECONDS_PER_DAY, ServiceTime, TimeError, hop_seconds};
