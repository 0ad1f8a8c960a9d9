pub mod airports_loader;
pub mod metar_fetcher;
pub mod neo_fetcher;

use thiserror::Error;

pub const USER_AGENT: &str = concat!("orbitgate/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
