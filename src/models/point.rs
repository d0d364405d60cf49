//! Punto GeoJSON
//!
//! Las ubicaciones (alumnos, colegios, cocheras) se guardan en JSONB como
//! GeoJSON Point: `{"type": "Point", "coordinates": [lng, lat]}`.

use serde::{Deserialize, Serialize};

/// Punto GeoJSON con coordenadas `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "point_type")]
    pub point_type: String,
    pub coordinates: [f64; 2],
}

fn point_type() -> String {
    "Point".to_string()
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            point_type: point_type(),
            coordinates: [lng, lat],
        }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    /// `(0, 0)` es el valor centinela "sin ubicación" heredado de los datos;
    /// esos puntos se excluyen de las rutas.
    pub fn is_set(&self) -> bool {
        self.coordinates[0] != 0.0 || self.coordinates[1] != 0.0
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_zero_is_not_set() {
        assert!(!GeoPoint::default().is_set());
        assert!(GeoPoint::new(-7.25, 112.75).is_set());
    }

    #[test]
    fn coordinates_are_lng_lat() {
        let p = GeoPoint::new(-7.25, 112.75);
        assert_eq!(p.lat(), -7.25);
        assert_eq!(p.lng(), 112.75);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["coordinates"][0], 112.75);
        assert_eq!(json["type"], "Point");
    }
}
