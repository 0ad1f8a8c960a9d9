use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::collectors::metar_fetcher::MetadataLookup;
use crate::core::geo::{BoundingBox, GeoPoint, PointKind};
use crate::utils::db::{DbError, GeoStore};

/// Finds points of one kind inside a degree box around an anchor of the other kind.
///
/// The anchor comes from the local store first and the remote lookup second.
/// Every failure along the way ends in an empty result, never an error.
#[derive(Clone)]
pub struct ProximityResolver {
    store: Arc<dyn GeoStore>,
    remote: Arc<dyn MetadataLookup>,
}

impl ProximityResolver {
    pub fn new(store: Arc<dyn GeoStore>, remote: Arc<dyn MetadataLookup>) -> Self {
        Self { store, remote }
    }

    pub async fn resolve_stations_near(&self, airport_id: &str, radius_deg: f64) -> Vec<GeoPoint> {
        self.resolve_near(PointKind::Airport, airport_id, radius_deg).await
    }

    pub async fn resolve_airports_near(&self, station_id: &str, radius_deg: f64) -> Vec<GeoPoint> {
        self.resolve_near(PointKind::Station, station_id, radius_deg).await
    }

    async fn resolve_near(&self, anchor_kind: PointKind, id: &str, radius_deg: f64) -> Vec<GeoPoint> {
        info!(kind = %anchor_kind, id, radius_deg, "Resolving nearby {}s", anchor_kind.opposite());
        match self.try_resolve_near(anchor_kind, id, radius_deg).await {
            Ok(points) => points,
            Err(e) => {
                error!(kind = %anchor_kind, id, error = %e, "Proximity lookup failed");
                Vec::new()
            }
        }
    }

    async fn try_resolve_near(
        &self,
        anchor_kind: PointKind,
        id: &str,
        radius_deg: f64,
    ) -> Result<Vec<GeoPoint>, DbError> {
        let anchor = match self.find_local(anchor_kind, id).await? {
            Some(point) => {
                info!(kind = %anchor_kind, id, lat = ?point.latitude, lon = ?point.longitude, "Found anchor in local store");
                Some(point)
            }
            None => {
                info!(kind = %anchor_kind, id, "Anchor not in local store, trying remote lookup");
                self.remote.fetch_by_identifier(id).await
            }
        };

        let Some((lat, lon)) = anchor.as_ref().and_then(GeoPoint::coordinates) else {
            warn!(kind = %anchor_kind, id, "Anchor not found or has invalid coordinates");
            return Ok(Vec::new());
        };

        let bbox = BoundingBox::around(lat, lon, radius_deg);
        debug!(
            id,
            min_lat = bbox.min_lat,
            max_lat = bbox.max_lat,
            min_lon = bbox.min_lon,
            max_lon = bbox.max_lon,
            "Bounding box"
        );

        let target = anchor_kind.opposite();
        let store = Arc::clone(&self.store);
        let hits = spawn_store(move || store.find_in_bounding_box(target, &bbox)).await?;
        info!(kind = %target, count = hits.len(), "Found points in bounding box");
        Ok(hits)
    }

    async fn find_local(&self, kind: PointKind, id: &str) -> Result<Option<GeoPoint>, DbError> {
        let store = Arc::clone(&self.store);
        let id = id.to_string();
        spawn_store(move || store.find_by_id(kind, &id)).await
    }
}

/// Runs a store call on the blocking pool so SQLite I/O never stalls other requests.
async fn spawn_store<T, F>(f: F) -> Result<T, DbError>
where
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DbError::Join(e.to_string()))?
}
