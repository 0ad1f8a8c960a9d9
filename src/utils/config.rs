use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::utils::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address: {value}")]
    InvalidBind { value: String },
    #[error("invalid number for {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Service settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub api_prefix: String,
    pub db_path: PathBuf,
    pub airports_csv: PathBuf,
    pub nasa_api_key: String,
    pub nasa_base_url: String,
    pub aviation_base_url: String,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_prefix: "/api/orbitgate/v1.0".to_string(),
            db_path: PathBuf::from("data/db/geo.sqlite"),
            airports_csv: PathBuf::from("data/airports.csv"),
            nasa_api_key: "DEMO_KEY".to_string(),
            nasa_base_url: "https://api.nasa.gov/neo/rest/v1".to_string(),
            aviation_base_url: "https://aviationweather.gov".to_string(),
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("ORBITGATE_BIND") {
            config.bind_addr = value.parse().map_err(|_| ConfigError::InvalidBind { value })?;
        }
        if let Some(value) = lookup("ORBITGATE_API_PREFIX") {
            config.api_prefix = normalize_prefix(&value);
        }
        if let Some(value) = lookup("ORBITGATE_DB_PATH") {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("ORBITGATE_AIRPORTS_CSV") {
            config.airports_csv = PathBuf::from(value);
        }
        if let Some(value) = lookup("NASA_API_KEY") {
            config.nasa_api_key = value;
        }
        if let Some(value) = lookup("NASA_BASE_URL") {
            config.nasa_base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("AVIATION_BASE_URL") {
            config.aviation_base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("ORBITGATE_CACHE_TTL_SECS") {
            let secs: u64 = value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { key: "ORBITGATE_CACHE_TTL_SECS", value })?;
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("ORBITGATE_CACHE_CAPACITY") {
            config.cache_capacity = value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { key: "ORBITGATE_CACHE_CAPACITY", value })?;
        }
        Ok(config)
    }
}

/// Leading slash, no trailing slash. An empty prefix mounts routes at the root.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
