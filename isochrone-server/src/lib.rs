//! Commute isochrone server.
//!
//! Builds a station network from a GTFS feed, then answers: "where can I
//! get to from here, on foot and by transit, within N minutes?" as GeoJSON
//! polygons.

pub mod cache;
pub mod domain;
pub mod feed;
pub mod isochrone;
pub mod network;
pub mod planner;
pub mod walkable;
pub mod web;
