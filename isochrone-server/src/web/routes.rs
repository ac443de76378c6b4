//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::future::join_all;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::isochrone::{IsochroneConfig, IsochroneOutcome, Origin};

use super::dto::*;
use super::state::AppState;

/// Most budgets accepted by one multi-budget request.
const MAX_BUDGETS: usize = 12;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/network", get(network))
        .route("/network/stats", get(network_stats))
        .route("/stations/:id", get(station))
        .route("/isochrone", get(isochrone))
        .route("/isochrones", get(isochrones))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The full persisted network document.
async fn network(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = serde_json::to_vec(state.engine.network().as_ref()).map_err(|e| {
        AppError::Internal {
            message: format!("Failed to serialize network: {e}"),
        }
    })?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Station and edge counts plus cache statistics.
async fn network_stats(State(state): State<AppState>) -> Json<NetworkStatsResponse> {
    let network = state.engine.network();
    Json(NetworkStatsResponse {
        station_count: network.station_count(),
        edge_count: network.edge_count(),
        cache: state.engine.cache_stats(),
    })
}

/// One station by id.
async fn station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let station = state
        .engine
        .network()
        .find_station(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown station: {id}"),
        })?;
    Ok(Json(station).into_response())
}

/// Isochrone for one origin and budget.
async fn isochrone(
    State(state): State<AppState>,
    Query(req): Query<IsochroneRequest>,
) -> Result<Json<IsochroneResponse>, AppError> {
    let config = state.engine.config();
    let origin = parse_origin(req.lat.as_deref(), req.lon.as_deref())?;
    let minutes = parse_minutes(required(req.minutes.as_deref(), "minutes")?, config)?;
    let walk_m = parse_walk(req.walk_m.as_deref(), config)?;

    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.compute_isochrone(origin, minutes * 60, walk_m)
    })
    .await?;

    log_outcome(origin, minutes, &outcome);
    Ok(Json(IsochroneResponse::from_outcome(&outcome, minutes, walk_m)))
}

/// Isochrones for several budgets around one origin, computed in parallel.
async fn isochrones(
    State(state): State<AppState>,
    Query(req): Query<IsochronesRequest>,
) -> Result<Json<IsochronesResponse>, AppError> {
    let config = state.engine.config();
    let origin = parse_origin(req.lat.as_deref(), req.lon.as_deref())?;
    let budgets = parse_budgets(required(req.budgets.as_deref(), "budgets")?, config)?;
    let walk_m = parse_walk(req.walk_m.as_deref(), config)?;

    let tasks = budgets.iter().map(|&minutes| {
        let engine = state.engine.clone();
        tokio::task::spawn_blocking(move || {
            engine.compute_isochrone(origin, minutes * 60, walk_m)
        })
    });
    let outcomes = join_all(tasks).await;

    let mut isochrones = Vec::with_capacity(budgets.len());
    for (minutes, outcome) in budgets.into_iter().zip(outcomes) {
        let outcome = outcome?;
        log_outcome(origin, minutes, &outcome);
        isochrones.push(BudgetIsochrone {
            minutes,
            result: IsochroneResponse::from_outcome(&outcome, minutes, walk_m),
        });
    }

    Ok(Json(IsochronesResponse { isochrones }))
}

fn log_outcome(origin: Origin, minutes: u32, outcome: &IsochroneOutcome) {
    match outcome {
        IsochroneOutcome::Found(isochrone) => info!(
            lat = origin.lat,
            lon = origin.lon,
            minutes,
            stations = isochrone.total_stations,
            "Isochrone served"
        ),
        IsochroneOutcome::NoResult(reason) => info!(
            lat = origin.lat,
            lon = origin.lon,
            minutes,
            %reason,
            "No isochrone"
        ),
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest {
            message: format!("Missing parameter: {name}"),
        })
}

fn parse_number(raw: &str, name: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest {
            message: format!("Invalid {name}: {raw}"),
        })
}

fn parse_origin(lat: Option<&str>, lon: Option<&str>) -> Result<Origin, AppError> {
    let lat_raw = required(lat, "lat")?;
    let lon_raw = required(lon, "lon")?;
    let lat = parse_number(lat_raw, "lat")?;
    let lon = parse_number(lon_raw, "lon")?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::BadRequest {
            message: format!("Latitude out of range: {lat_raw}"),
        });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::BadRequest {
            message: format!("Longitude out of range: {lon_raw}"),
        });
    }
    Ok(Origin::new(lat, lon))
}

/// A budget in whole minutes, between 1 and the configured maximum.
fn parse_minutes(raw: &str, config: &IsochroneConfig) -> Result<u32, AppError> {
    let minutes: u32 = raw.trim().parse().map_err(|_| AppError::BadRequest {
        message: format!("Invalid minutes: {raw}"),
    })?;
    if minutes == 0 || minutes > config.max_budget_mins {
        return Err(AppError::BadRequest {
            message: format!(
                "Minutes must be between 1 and {}: {raw}",
                config.max_budget_mins
            ),
        });
    }
    Ok(minutes)
}

/// Comma-separated budgets, kept in the order given.
fn parse_budgets(raw: &str, config: &IsochroneConfig) -> Result<Vec<u32>, AppError> {
    let budgets = raw
        .split(',')
        .map(|part| parse_minutes(part, config))
        .collect::<Result<Vec<_>, _>>()?;

    if budgets.len() > MAX_BUDGETS {
        return Err(AppError::BadRequest {
            message: format!("At most {MAX_BUDGETS} budgets per request"),
        });
    }
    Ok(budgets)
}

/// Walking limit in metres, defaulting to the configured distance.
fn parse_walk(raw: Option<&str>, config: &IsochroneConfig) -> Result<f64, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(config.default_walk_distance_m);
    };
    let walk_m = parse_number(raw, "walk_m")?;
    if walk_m <= 0.0 || walk_m > config.max_walk_distance_m {
        return Err(AppError::BadRequest {
            message: format!(
                "walk_m must be above 0 and at most {}: {raw}",
                config.max_walk_distance_m
            ),
        });
    }
    Ok(walk_m)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<JoinError> for AppError {
    fn from(e: JoinError) -> Self {
        AppError::Internal {
            message: format!("Isochrone task failed: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, IsochroneCache};
    use crate::domain::{Edge, Station, StationId};
    use crate::isochrone::IsochroneEngine;
    use crate::network::Network;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn station(s: &str, lat: f64, lon: f64) -> Station {
        Station {
            id: id(s),
            name: format!("{s} Station"),
            lat,
            lon,
            accessible: false,
            routes_served: vec!["Red".to_string()],
        }
    }

    fn app() -> Router {
        let network = Network {
            stations: vec![
                station("A", 42.361, -71.06),
                station("B", 42.400, -71.06),
                station("C", 42.450, -71.06),
            ],
            edges: vec![
                Edge {
                    from_id: id("A"),
                    to_id: id("B"),
                    travel_time_sec: 600,
                    route_id: "Red".to_string(),
                },
                Edge {
                    from_id: id("B"),
                    to_id: id("C"),
                    travel_time_sec: 1200,
                    route_id: "Red".to_string(),
                },
            ],
        };
        let engine = IsochroneEngine::new(
            Arc::new(network),
            IsochroneConfig::default(),
            IsochroneCache::new(&CacheConfig::default()),
        );
        create_router(AppState::new(engine))
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn network_document() {
        let (status, body) = get("/network").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stations"].as_array().unwrap().len(), 3);
        assert_eq!(body["stations"][0]["routesServed"][0], "Red");
        assert_eq!(body["edges"][0]["travelTimeSec"], 600);
    }

    #[tokio::test]
    async fn network_stats() {
        let (status, body) = get("/network/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stationCount"], 3);
        assert_eq!(body["edgeCount"], 2);
        assert_eq!(body["cache"]["entries"], 0);
    }

    #[tokio::test]
    async fn station_lookup() {
        let (status, body) = get("/stations/B").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "B Station");

        let (status, body) = get("/stations/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown station: nope");
    }

    #[tokio::test]
    async fn isochrone_feature() {
        let (status, body) = get("/isochrone?lat=42.36&lon=-71.06&minutes=30&walk_m=500").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "Feature");
        assert_eq!(body["geometry"]["type"], "MultiPolygon");
        assert_eq!(body["properties"]["totalStations"], 2);
        assert_eq!(body["properties"]["reachableStations"][0]["stationId"], "A");
    }

    #[tokio::test]
    async fn isochrone_uses_default_walk() {
        let (status, body) = get("/isochrone?lat=42.36&lon=-71.06&minutes=30").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["properties"]["walkM"], 800.0);
    }

    #[tokio::test]
    async fn isochrone_no_result() {
        let (status, body) = get("/isochrone?lat=40&lon=-70&minutes=30").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "no_result");
        assert_eq!(body["reason"], "no_station_in_walk_range");
    }

    #[tokio::test]
    async fn isochrone_bad_parameters() {
        for uri in [
            "/isochrone?lat=abc&lon=-71.06&minutes=30",
            "/isochrone?lat=42.36&lon=-71.06",
            "/isochrone?lat=42.36&lon=-71.06&minutes=0",
            "/isochrone?lat=42.36&lon=-71.06&minutes=-5",
            "/isochrone?lat=91&lon=-71.06&minutes=30",
            "/isochrone?lat=42.36&lon=-200&minutes=30",
            "/isochrone?lat=42.36&lon=-71.06&minutes=30&walk_m=0",
            "/isochrone?lat=42.36&lon=-71.06&minutes=30&walk_m=NaN",
            "/isochrone?lat=42.36&lon=-71.06&minutes=99999",
        ] {
            let (status, body) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn multiple_budgets_in_order() {
        let (status, body) = get("/isochrones?lat=42.36&lon=-71.06&budgets=1,30,60&walk_m=500").await;
        assert_eq!(status, StatusCode::OK);

        let entries = body["isochrones"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["minutes"], 1);
        assert_eq!(entries[0]["result"]["reason"], "budget_too_small");
        assert_eq!(entries[1]["result"]["properties"]["totalStations"], 2);
        assert_eq!(entries[2]["result"]["properties"]["totalStations"], 3);
    }

    #[tokio::test]
    async fn multiple_budgets_rejects_bad_list() {
        let (status, _) = get("/isochrones?lat=42.36&lon=-71.06&budgets=15,,30").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/isochrones?lat=42.36&lon=-71.06").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let many = vec!["15"; MAX_BUDGETS + 1].join(",");
        let (status, _) = get(&format!("/isochrones?lat=42.36&lon=-71.06&budgets={many}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn budgets_parse_in_order() {
        let config = IsochroneConfig::default();
        assert_eq!(parse_budgets("60, 15,30", &config).unwrap(), vec![60, 15, 30]);
    }

    #[test]
    fn walk_defaults_when_blank() {
        let config = IsochroneConfig::default();
        assert_eq!(parse_walk(None, &config).unwrap(), 800.0);
        assert_eq!(parse_walk(Some(" "), &config).unwrap(), 800.0);
        assert_eq!(parse_walk(Some("250"), &config).unwrap(), 250.0);
    }
}
