//! DTOs de zonas

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::driver::Driver;
use crate::models::zone::Zone;

/// Request para crear una zona
#[derive(Debug, Deserialize, Validate)]
pub struct CreateZoneRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// GeoJSON Feature con geometría Polygon o MultiPolygon
    pub geojson: serde_json::Value,
}

/// Request para actualizar la geometría de una zona
#[derive(Debug, Deserialize)]
pub struct UpdateZoneRequest {
    pub geojson: serde_json::Value,
}

/// Query de resolución de zona por coordenadas
#[derive(Debug, Deserialize)]
pub struct ResolveZoneQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Zona resuelta con su conductor asignado (si lo hay). Un punto fuera de
/// toda zona produce un body `null`, no un error.
#[derive(Debug, Serialize)]
pub struct ResolvedZoneResponse {
    pub zone: Zone,
    pub driver: Option<Driver>,
}
