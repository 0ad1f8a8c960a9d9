use std::fmt;

/// Which of the two parallel tables a point lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Airport,
    Station,
}

impl PointKind {
    pub fn table(self) -> &'static str {
        match self {
            PointKind::Airport => "airport_cache",
            PointKind::Station => "station_cache",
        }
    }

    /// The table a proximity query searches when anchored on this kind.
    pub fn opposite(self) -> PointKind {
        match self {
            PointKind::Airport => PointKind::Station,
            PointKind::Station => PointKind::Airport,
        }
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Airport => f.write_str("airport"),
            PointKind::Station => f.write_str("station"),
        }
    }
}

/// An airport or weather station keyed by its ICAO-style identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub id: String,
    pub display_name: String,
    pub region_code: String,
    pub country_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl GeoPoint {
    /// Coordinates usable as a proximity anchor. A point missing either axis has none.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Axis-aligned lat/lon rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Square box of `radius_deg` degrees on each side of the anchor.
    /// Degrees are not latitude-corrected, so the box is not isotropic in real distance.
    pub fn around(lat: f64, lon: f64, radius_deg: f64) -> Self {
        Self {
            min_lat: lat - radius_deg,
            max_lat: lat + radius_deg,
            min_lon: lon - radius_deg,
            max_lon: lon + radius_deg,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}
