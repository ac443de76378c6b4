//! Transit feed ingestion.
//!
//! Reads the `stops`, `stop_times`, `trips` and `routes` tables of a feed
//! directory into typed rows. Ingestion is a one-shot batch step: the first
//! failure aborts it.

mod error;
mod reader;
mod rows;

pub use error::FeedError;
pub use reader::{Feed, ROUTES_FILE, STOP_TIMES_FILE, STOPS_FILE, TRIPS_FILE, parse_table};
pub use rows::{RouteRow, StopRow, StopTimeRow, TripRow};
