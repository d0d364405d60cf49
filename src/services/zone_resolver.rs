//! Resolución de zonas (geocercas)
//!
//! Mapea una coordenada a la zona que la contiene y al conductor asignado
//! a esa zona. Un punto fuera de toda zona es un resultado normal (None),
//! no un error.

use geo::MultiPolygon;
use sqlx::PgPool;
use tracing::warn;

use crate::models::driver::Driver;
use crate::models::zone::Zone;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::zone_repository::ZoneRepository;
use crate::utils::errors::AppError;
use crate::utils::geo::{multipolygon_from_geojson, polygon_area, polygon_contains};

/// Zona con su geometría ya parseada desde el GeoJSON almacenado
pub struct LoadedZone {
    pub zone: Zone,
    polygon: MultiPolygon<f64>,
    area: f64,
}

impl LoadedZone {
    pub fn from_zone(zone: Zone) -> Option<Self> {
        let polygon = match multipolygon_from_geojson(&zone.geojson.0) {
            Some(p) => p,
            None => {
                warn!("⚠️ Zona '{}' con GeoJSON no poligonal, se ignora", zone.name);
                return None;
            }
        };
        let area = polygon_area(&polygon);
        Some(Self { zone, polygon, area })
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        polygon_contains(&self.polygon, lat, lng)
    }
}

/// Zona ganadora para un punto. Si el punto cae en varios polígonos gana
/// el de área menor: desempate determinista, independiente del orden de
/// inserción.
pub fn match_zone(zones: &[LoadedZone], lat: f64, lng: f64) -> Option<&LoadedZone> {
    zones
        .iter()
        .filter(|z| z.contains(lat, lng))
        .min_by(|a, b| a.area.total_cmp(&b.area))
}

pub struct ZoneResolver {
    zones: ZoneRepository,
    drivers: DriverRepository,
}

impl ZoneResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            zones: ZoneRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool),
        }
    }

    /// Resolver la zona que contiene el punto y su conductor asignado.
    ///
    /// Devuelve `Ok(None)` cuando el punto no cae en ninguna zona de
    /// servicio; el conductor puede ser `None` aunque haya zona.
    pub async fn resolve_zone(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<(Zone, Option<Driver>)>, AppError> {
        let loaded: Vec<LoadedZone> = self
            .zones
            .find_all()
            .await?
            .into_iter()
            .filter_map(LoadedZone::from_zone)
            .collect();

        let matched = match match_zone(&loaded, lat, lng) {
            Some(m) => m,
            None => return Ok(None),
        };

        let driver = self.drivers.find_by_zone(&matched.zone.name).await?;
        Ok(Some((matched.zone.clone(), driver)))
    }

    /// Conductor asignado a una zona por nombre (lado no geométrico del
    /// resolver, usado por la máquina de estados)
    pub async fn driver_for_zone_name(&self, zone: &str) -> Result<Option<Driver>, AppError> {
        self.drivers.find_by_zone(zone).await
    }

    /// Conductores que cubren cualquiera de las zonas dadas (los
    /// "conductores relevantes" de un tutor)
    pub async fn drivers_for_zones(&self, zones: &[String]) -> Result<Vec<Driver>, AppError> {
        if zones.is_empty() {
            return Ok(Vec::new());
        }
        self.drivers.find_by_zones(zones).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn zone_with_square(name: &str, min: f64, max: f64) -> LoadedZone {
        let geojson = json!({
            "type": "Feature",
            "properties": { "name": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [min, min], [max, min], [max, max], [min, max], [min, min]
                ]]
            }
        });
        LoadedZone::from_zone(Zone {
            id: Uuid::new_v4(),
            name: name.to_string(),
            geojson: Json(geojson),
            created_at: Utc::now(),
        })
        .expect("square polygon should parse")
    }

    #[test]
    fn point_inside_single_zone_resolves_to_it() {
        let zones = vec![zone_with_square("north", 0.0, 1.0), zone_with_square("south", 5.0, 6.0)];
        let matched = match_zone(&zones, 0.5, 0.5).unwrap();
        assert_eq!(matched.zone.name, "north");
    }

    #[test]
    fn point_outside_all_zones_resolves_to_none() {
        let zones = vec![zone_with_square("north", 0.0, 1.0)];
        assert!(match_zone(&zones, 3.0, 3.0).is_none());
    }

    #[test]
    fn overlap_resolves_to_smallest_area() {
        // El cuadrado chico está contenido en el grande; gana el chico
        // sin importar el orden de carga
        let big_first = vec![zone_with_square("big", 0.0, 10.0), zone_with_square("small", 4.0, 6.0)];
        let small_first = vec![zone_with_square("small", 4.0, 6.0), zone_with_square("big", 0.0, 10.0)];

        assert_eq!(match_zone(&big_first, 5.0, 5.0).unwrap().zone.name, "small");
        assert_eq!(match_zone(&small_first, 5.0, 5.0).unwrap().zone.name, "small");
    }

    #[test]
    fn resolution_is_stable_across_calls() {
        let zones = vec![zone_with_square("big", 0.0, 10.0), zone_with_square("small", 4.0, 6.0)];
        let first = match_zone(&zones, 5.0, 5.0).unwrap().zone.name.clone();
        for _ in 0..10 {
            assert_eq!(match_zone(&zones, 5.0, 5.0).unwrap().zone.name, first);
        }
    }

    #[test]
    fn malformed_geojson_zone_is_skipped() {
        let bad = Zone {
            id: Uuid::new_v4(),
            name: "broken".to_string(),
            geojson: Json(json!({ "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 1.0] } })),
            created_at: Utc::now(),
        };
        assert!(LoadedZone::from_zone(bad).is_none());
    }
}
