use async_trait::async_trait;
use tracing::{debug, warn};

use super::{FetchError, USER_AGENT};
use crate::core::asteroid::{CloseApproachObservation, NeoObject};

/// Source of close-approach history for a single asteroid.
#[async_trait]
pub trait AsteroidSource: Send + Sync {
    async fn close_approaches(&self, asteroid_id: &str) -> Result<Vec<CloseApproachObservation>, FetchError>;
}

/// Client for the NASA NeoWs single-object lookup.
#[derive(Debug, Clone)]
pub struct NeoFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NeoFetcher {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl AsteroidSource for NeoFetcher {
    async fn close_approaches(&self, asteroid_id: &str) -> Result<Vec<CloseApproachObservation>, FetchError> {
        let url = format!("{}/neo/{}", self.base_url, asteroid_id);
        debug!(%url, "Fetching asteroid");

        let resp = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(?status, asteroid_id, "Non-success response fetching asteroid");
            return Err(FetchError::Status(status));
        }

        let body = resp.text().await?;
        let neo: NeoObject = serde_json::from_str(&body)?;
        Ok(neo.into_observations())
    }
}
