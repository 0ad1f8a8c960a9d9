use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Json, Router};
use chrono::{Local, Months, NaiveDate};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::types::{AirportDto, AsteroidPathDto, HealthDto, StationDto};
use crate::core::asteroid::TransitionPath;
use crate::core::geo::GeoPoint;
use crate::predictors::asteroid_paths::AsteroidPathResolver;
use crate::predictors::proximity::ProximityResolver;
use crate::predictors::transitions::parse_date;
use crate::utils::cache::ResponseCache;

pub const SERVICE_NAME: &str = "orbitgate";

/// One cache per endpoint, each with its own capacity.
pub struct Caches {
    pub asteroid_paths: ResponseCache<Vec<TransitionPath>>,
    pub nearby_airports: ResponseCache<Vec<GeoPoint>>,
    pub nearby_stations: ResponseCache<Vec<GeoPoint>>,
}

impl Caches {
    pub fn new(ttl: std::time::Duration, capacity: usize) -> Self {
        Self {
            asteroid_paths: ResponseCache::new("asteroid_paths", ttl, capacity),
            nearby_airports: ResponseCache::new("nearby_airports", ttl, capacity),
            nearby_stations: ResponseCache::new("nearby_stations", ttl, capacity),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub proximity: ProximityResolver,
    pub asteroids: AsteroidPathResolver,
    pub caches: Arc<Caches>,
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    #[serde(rename = "fromDate", default)]
    from_date: Option<String>,
    #[serde(rename = "toDate", default)]
    to_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProximityQuery {
    #[serde(rename = "closestBy", default)]
    closest_by: Option<String>,
}

const DEFAULT_LOOKBACK_YEARS: u32 = 100;

pub fn build_router(state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/asteroids/:asteroid_id/paths", get(get_asteroid_paths))
        .route("/airports/:airport_id/stations", get(get_closest_stations))
        .route("/stations/:station_id/airports", get(get_closest_airports))
        .with_state(state);

    let app = if prefix.is_empty() { api } else { Router::new().nest(prefix, api) };
    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

pub async fn run_server(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    let body = HealthDto {
        status: "UP",
        timestamp: Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(serde_json::json!(body)))
}

/// Blank or absent means "use the default".
fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(s).map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// Blank or absent is a zero radius.
fn radius(raw: Option<&str>) -> Result<f64, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map_err(|_| format!("invalid closestBy: {s}")),
        None => Ok(0.0),
    }
}

async fn get_asteroid_paths(
    Path(asteroid_id): Path<String>,
    Query(q): Query<PathQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let today = Local::now().date_naive();
    let (from, to) = match (optional_date(q.from_date.as_deref()), optional_date(q.to_date.as_deref())) {
        (Ok(from), Ok(to)) => (
            from.unwrap_or_else(|| today.checked_sub_months(Months::new(DEFAULT_LOOKBACK_YEARS * 12)).unwrap_or(NaiveDate::MIN)),
            to.unwrap_or(today),
        ),
        (Err(e), _) | (_, Err(e)) => {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": e})));
        }
    };

    let key = format!("{asteroid_id}-{from}-{to}");
    let paths = state
        .caches
        .asteroid_paths
        .get_or_compute(key, || state.asteroids.paths(&asteroid_id, from, to))
        .await;

    let out: Vec<AsteroidPathDto> = paths.into_iter().map(AsteroidPathDto::from).collect();
    (StatusCode::OK, Json(serde_json::json!(out)))
}

async fn get_closest_stations(
    Path(airport_id): Path<String>,
    Query(q): Query<ProximityQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let closest_by = match radius(q.closest_by.as_deref()) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": e}))),
    };

    let key = format!("{}-{}", airport_id, closest_by);
    let stations = state
        .caches
        .nearby_stations
        .get_or_compute(key, || state.proximity.resolve_stations_near(&airport_id, closest_by))
        .await;

    let out: Vec<StationDto> = stations.into_iter().map(StationDto::from).collect();
    (StatusCode::OK, Json(serde_json::json!(out)))
}

async fn get_closest_airports(
    Path(station_id): Path<String>,
    Query(q): Query<ProximityQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let closest_by = match radius(q.closest_by.as_deref()) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": e}))),
    };

    let key = format!("{}-{}", station_id, closest_by);
    let airports = state
        .caches
        .nearby_airports
        .get_or_compute(key, || state.proximity.resolve_airports_near(&station_id, closest_by))
        .await;

    let out: Vec<AirportDto> = airports.into_iter().map(AirportDto::from).collect();
    (StatusCode::OK, Json(serde_json::json!(out)))
}
