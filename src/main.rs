mod api;
mod collectors;
mod core;
mod predictors;
mod utils;

use std::sync::Arc;

use tracing::{error, info};

use crate::collectors::metar_fetcher::MetarFetcher;
use crate::collectors::neo_fetcher::NeoFetcher;
use crate::predictors::asteroid_paths::AsteroidPathResolver;
use crate::predictors::proximity::ProximityResolver;
use crate::utils::db::{GeoStore, SqliteStore};

#[tokio::main]
async fn main() {
    utils::logging::init();

    let config = match utils::config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return;
        }
    };
    info!(bind = %config.bind_addr, prefix = %config.api_prefix, "orbitgate initialized");

    let store = match SqliteStore::open_or_init(&config.db_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(error = %e, path = %config.db_path.display(), "Failed to initialize database");
            return;
        }
    };

    // Load completes before the listener is bound.
    let load_store = Arc::clone(&store);
    let csv_path = config.airports_csv.clone();
    match tokio::task::spawn_blocking(move || {
        collectors::airports_loader::load_into(load_store.as_ref(), &csv_path)
    })
    .await
    {
        Ok(Ok(summary)) => info!(loaded = summary.loaded, skipped = summary.skipped, "Airports dataset ready"),
        Ok(Err(e)) => error!(error = %e, "Error loading airports dataset"),
        Err(e) => error!(error = %e, "Airports load task failed"),
    }

    let remote = match MetarFetcher::new(&config.aviation_base_url) {
        Ok(f) => f,
        Err(e) => {
            error!(error = %e, "Failed to build station metadata client");
            return;
        }
    };
    let neo = match NeoFetcher::new(&config.nasa_base_url, &config.nasa_api_key) {
        Ok(f) => f,
        Err(e) => {
            error!(error = %e, "Failed to build asteroid client");
            return;
        }
    };

    let store: Arc<dyn GeoStore> = store;
    let state = api::server::AppState {
        proximity: ProximityResolver::new(store, Arc::new(remote)),
        asteroids: AsteroidPathResolver::new(Arc::new(neo)),
        caches: Arc::new(api::server::Caches::new(config.cache_ttl, config.cache_capacity)),
    };

    let app = api::server::build_router(state, &config.api_prefix);
    if let Err(e) = api::server::run_server(app, config.bind_addr).await {
        error!(error = %e, "API server stopped");
    }
}
