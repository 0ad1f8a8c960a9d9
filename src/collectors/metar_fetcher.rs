use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{FetchError, USER_AGENT};
use crate::core::geo::GeoPoint;

pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote fallback for anchors missing from the local store.
///
/// Never fails: transport errors, timeouts, bad statuses and unparseable
/// payloads all come back as `None`.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn fetch_by_identifier(&self, id: &str) -> Option<GeoPoint>;
}

/// Aviation Weather Center METAR endpoint, used for its station metadata.
#[derive(Debug, Clone)]
pub struct MetarFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl MetarFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    async fn try_fetch(&self, id: &str) -> Result<Option<GeoPoint>, FetchError> {
        let url = format!("{}/api/data/metar", self.base_url);
        debug!(%url, id, "Fetching station metadata");

        let resp = self
            .client
            .get(&url)
            .query(&[("ids", id), ("format", "json")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = resp.text().await?;
        Ok(parse_metar_json(&body, id)?)
    }
}

#[async_trait]
impl MetadataLookup for MetarFetcher {
    async fn fetch_by_identifier(&self, id: &str) -> Option<GeoPoint> {
        match self.try_fetch(id).await {
            Ok(Some(point)) => {
                debug!(id, lat = ?point.latitude, lon = ?point.longitude, "Found point via remote lookup");
                Some(point)
            }
            Ok(None) => {
                warn!(id, "No remote metadata for identifier");
                None
            }
            Err(FetchError::Decode(e)) => {
                error!(id, error = %e, "Failed to parse remote metadata");
                None
            }
            Err(e) => {
                warn!(id, error = %e, "Remote metadata lookup failed");
                None
            }
        }
    }
}

/// Reads the first element of a METAR JSON array.
///
/// Missing `lat`/`lon`/`elev` become `0.0` rather than absent, so a record
/// without coordinates still anchors a box at the origin.
pub fn parse_metar_json(body: &str, requested_id: &str) -> Result<Option<GeoPoint>, serde_json::Error> {
    let root: Value = serde_json::from_str(body)?;
    let Some(first) = root.as_array().and_then(|a| a.first()) else {
        return Ok(None);
    };

    let site = text_or(first.get("site"), "");
    Ok(Some(GeoPoint {
        id: text_or(first.get("icaoId"), requested_id),
        display_name: text_or(first.get("name"), &site),
        region_code: text_or(first.get("state"), ""),
        country_code: text_or(first.get("country"), ""),
        latitude: Some(number_or_zero(first.get("lat"))),
        longitude: Some(number_or_zero(first.get("lon"))),
        elevation: Some(number_or_zero(first.get("elev"))),
    }))
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

fn number_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
