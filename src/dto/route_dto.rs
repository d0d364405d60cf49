//! DTOs del proveedor de rutas (GraphHopper)
//!
//! Structs de wire para el POST de routing y la respuesta con los puntos
//! decodificados, más la respuesta propia de la API de navegación.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request al proveedor: lista ordenada de `[lng, lat]`, perfil de viaje
/// y puntos decodificados (no encoded polyline)
#[derive(Debug, Serialize)]
pub struct RoutingProviderRequest {
    /// GraphHopper espera pares `[longitude, latitude]`
    pub points: Vec<[f64; 2]>,
    pub profile: String,
    pub calc_points: bool,
    pub points_encoded: bool,
}

impl RoutingProviderRequest {
    pub fn car(points: Vec<[f64; 2]>) -> Self {
        Self {
            points,
            profile: "car".to_string(),
            calc_points: true,
            points_encoded: false,
        }
    }
}

/// Respuesta del proveedor: uno o más paths con coordenadas decodificadas
#[derive(Debug, Deserialize)]
pub struct RoutingProviderResponse {
    pub paths: Vec<RoutingPath>,
}

#[derive(Debug, Deserialize)]
pub struct RoutingPath {
    pub points: RoutingPoints,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub time: i64,
}

#[derive(Debug, Deserialize)]
pub struct RoutingPoints {
    /// Pares `[longitude, latitude]`
    pub coordinates: Vec<[f64; 2]>,
}

/// Polilínea servida a los clientes, en pares `[lat, lng]` listos para el mapa
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteResponse {
    pub driver_id: Uuid,
    pub polyline: Vec<[f64; 2]>,
    pub waypoint_count: usize,
}
