//! Data transfer objects for web requests and responses.

use geojson::{Feature, Geometry, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::CacheStats;
use crate::isochrone::{Isochrone, IsochroneOutcome, NoResult};
use crate::planner::ReachableStation;

/// Query for a single isochrone.
///
/// Fields arrive as raw strings so that bad values produce a JSON 400
/// rather than the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct IsochroneRequest {
    /// Origin latitude in degrees
    pub lat: Option<String>,

    /// Origin longitude in degrees
    pub lon: Option<String>,

    /// Travel-time budget in minutes
    pub minutes: Option<String>,

    /// Walking limit in metres (defaults to the configured distance)
    pub walk_m: Option<String>,
}

/// Query for several budgets around one origin.
#[derive(Debug, Default, Deserialize)]
pub struct IsochronesRequest {
    /// Origin latitude in degrees
    pub lat: Option<String>,

    /// Origin longitude in degrees
    pub lon: Option<String>,

    /// Comma-separated budgets in minutes, e.g. "15,30,45,60"
    pub budgets: Option<String>,

    /// Walking limit in metres (defaults to the configured distance)
    pub walk_m: Option<String>,
}

/// Body returned when no isochrone exists.
#[derive(Debug, Serialize)]
pub struct NoResultResponse {
    /// Always "no_result"
    pub status: &'static str,

    /// Machine-readable reason
    pub reason: NoResult,

    /// Human-readable reason
    pub message: String,
}

impl NoResultResponse {
    pub fn new(reason: NoResult) -> Self {
        Self {
            status: "no_result",
            reason,
            message: reason.to_string(),
        }
    }
}

/// Either a GeoJSON feature or a no-result body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IsochroneResponse {
    Found(Box<Feature>),
    NoResult(NoResultResponse),
}

impl IsochroneResponse {
    /// Render an outcome for the given request parameters.
    pub fn from_outcome(outcome: &IsochroneOutcome, minutes: u32, walk_m: f64) -> Self {
        match outcome {
            IsochroneOutcome::Found(isochrone) => {
                IsochroneResponse::Found(Box::new(to_feature(isochrone, minutes, walk_m)))
            }
            IsochroneOutcome::NoResult(reason) => {
                IsochroneResponse::NoResult(NoResultResponse::new(*reason))
            }
        }
    }
}

/// One entry of a multi-budget response.
#[derive(Debug, Serialize)]
pub struct BudgetIsochrone {
    /// Budget in minutes
    pub minutes: u32,

    /// Isochrone for this budget
    pub result: IsochroneResponse,
}

/// Response for the multi-budget endpoint, ordered as requested.
#[derive(Debug, Serialize)]
pub struct IsochronesResponse {
    pub isochrones: Vec<BudgetIsochrone>,
}

/// Network size and cache statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatsResponse {
    pub station_count: usize,
    pub edge_count: usize,
    pub cache: CacheStats,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Build the GeoJSON feature for an isochrone.
///
/// The geometry is the walkshed multipolygon; properties carry the request
/// parameters and the reached stations.
pub fn to_feature(isochrone: &Isochrone, minutes: u32, walk_m: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("status".to_string(), json!("ok"));
    properties.insert("minutes".to_string(), json!(minutes));
    properties.insert("walkM".to_string(), json!(walk_m));
    properties.insert(
        "totalStations".to_string(),
        json!(isochrone.total_stations),
    );
    properties.insert(
        "reachableStations".to_string(),
        json!(stations_json(&isochrone.reachable_stations)),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&isochrone.polygon))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn stations_json(stations: &[ReachableStation]) -> serde_json::Value {
    serde_json::to_value(stations).unwrap_or_else(|_| json!([]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use geo::{MultiPolygon, polygon};
    use std::sync::Arc;

    fn isochrone() -> Isochrone {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        Isochrone {
            polygon: MultiPolygon::new(vec![square]),
            reachable_stations: vec![ReachableStation {
                station_id: StationId::parse("place-pktrm").unwrap(),
                travel_time_sec: 120,
            }],
            total_stations: 1,
        }
    }

    #[test]
    fn feature_has_multipolygon_and_properties() {
        let value = serde_json::to_value(to_feature(&isochrone(), 30, 800.0)).unwrap();

        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "MultiPolygon");
        assert_eq!(value["properties"]["status"], "ok");
        assert_eq!(value["properties"]["minutes"], 30);
        assert_eq!(value["properties"]["totalStations"], 1);
        assert_eq!(
            value["properties"]["reachableStations"][0]["stationId"],
            "place-pktrm"
        );
        assert_eq!(
            value["properties"]["reachableStations"][0]["travelTimeSec"],
            120
        );
    }

    #[test]
    fn no_result_body() {
        let outcome = IsochroneOutcome::NoResult(NoResult::BudgetTooSmall);
        let value =
            serde_json::to_value(IsochroneResponse::from_outcome(&outcome, 1, 800.0)).unwrap();

        assert_eq!(value["status"], "no_result");
        assert_eq!(value["reason"], "budget_too_small");
    }

    #[test]
    fn found_body_is_untagged_feature() {
        let outcome = IsochroneOutcome::Found(Arc::new(isochrone()));
        let value =
            serde_json::to_value(IsochroneResponse::from_outcome(&outcome, 30, 800.0)).unwrap();
        assert_eq!(value["type"], "Feature");
    }
}
