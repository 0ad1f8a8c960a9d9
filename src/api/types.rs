use serde::Serialize;

use crate::core::asteroid::TransitionPath;
use crate::core::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsteroidPathDto {
    pub from_planet: String,
    pub to_planet: String,
    pub from_date: String,
    pub to_date: String,
}

impl From<TransitionPath> for AsteroidPathDto {
    fn from(p: TransitionPath) -> Self {
        Self { from_planet: p.from_body, to_planet: p.to_body, from_date: p.from_date, to_date: p.to_date }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportDto {
    pub id: String,
    pub name: String,
    pub state: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl From<GeoPoint> for AirportDto {
    fn from(p: GeoPoint) -> Self {
        Self {
            id: p.id,
            name: p.display_name,
            state: p.region_code,
            country: p.country_code,
            latitude: p.latitude,
            longitude: p.longitude,
            elevation: p.elevation,
        }
    }
}

/// Station-shaped record; elevation is whole feet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDto {
    pub id: String,
    pub site: String,
    pub state: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<i64>,
}

impl From<GeoPoint> for StationDto {
    fn from(p: GeoPoint) -> Self {
        Self {
            id: p.id,
            site: p.display_name,
            state: p.region_code,
            country: p.country_code,
            latitude: p.latitude,
            longitude: p.longitude,
            elevation: p.elevation.map(|e| e as i64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
}
