//! Reading feed tables from a directory.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::error::FeedError;
use super::rows::{RouteRow, StopRow, StopTimeRow, TripRow};

pub const STOPS_FILE: &str = "stops.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";
pub const TRIPS_FILE: &str = "trips.txt";
pub const ROUTES_FILE: &str = "routes.txt";

const STOPS_COLUMNS: &[&str] = &[
    "stop_id",
    "stop_name",
    "stop_lat",
    "stop_lon",
    "location_type",
    "parent_station",
];
const STOP_TIMES_COLUMNS: &[&str] = &[
    "trip_id",
    "stop_id",
    "arrival_time",
    "departure_time",
    "stop_sequence",
];
const TRIPS_COLUMNS: &[&str] = &["trip_id", "route_id"];
const ROUTES_COLUMNS: &[&str] = &["route_id", "route_short_name"];

/// The four parsed tables of a transit feed.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub stops: Vec<StopRow>,
    pub stop_times: Vec<StopTimeRow>,
    pub trips: Vec<TripRow>,
    pub routes: Vec<RouteRow>,
}

impl Feed {
    /// Read all four required tables from `dir`.
    ///
    /// Fails on the first missing file, missing column or undecodable row.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Self, FeedError> {
        let dir = dir.as_ref();

        let stops = read_table(&dir.join(STOPS_FILE), STOPS_FILE, STOPS_COLUMNS)?;
        let stop_times = read_table(
            &dir.join(STOP_TIMES_FILE),
            STOP_TIMES_FILE,
            STOP_TIMES_COLUMNS,
        )?;
        let trips = read_table(&dir.join(TRIPS_FILE), TRIPS_FILE, TRIPS_COLUMNS)?;
        let routes = read_table(&dir.join(ROUTES_FILE), ROUTES_FILE, ROUTES_COLUMNS)?;

        let feed = Self {
            stops,
            stop_times,
            trips,
            routes,
        };

        info!(
            dir = %dir.display(),
            stops = feed.stops.len(),
            stop_times = feed.stop_times.len(),
            trips = feed.trips.len(),
            routes = feed.routes.len(),
            "Read feed"
        );

        Ok(feed)
    }
}

/// Open and parse one table.
fn read_table<T: DeserializeOwned>(
    path: &Path,
    file: &'static str,
    required: &'static [&'static str],
) -> Result<Vec<T>, FeedError> {
    let handle = File::open(path).map_err(|source| FeedError::Read {
        path: PathBuf::from(path),
        source,
    })?;
    let rows = parse_table(BufReader::new(handle), file, required)?;
    debug!(file, rows = rows.len(), "Parsed table");
    Ok(rows)
}

/// Parse a comma-separated table with a header row.
///
/// Every name in `required` must appear in the header. Quoted fields may
/// contain commas and escaped quotes.
pub fn parse_table<T: DeserializeOwned, R: Read>(
    reader: R,
    file: &'static str,
    required: &'static [&'static str],
) -> Result<Vec<T>, FeedError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|source| FeedError::Csv { file, source })?;
    let headers: StringRecord = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();

    for &column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(FeedError::MissingColumn { file, column });
        }
    }
    rdr.set_headers(headers);

    rdr.deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| FeedError::Csv { file, source })
}
