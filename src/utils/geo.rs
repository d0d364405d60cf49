//! Utilidades geográficas
//!
//! Geocercas (point-in-polygon), áreas y distancias sobre coordenadas
//! WGS84. Los polígonos de zona llegan como GeoJSON almacenado en JSONB.

use geo::{Area, Contains, Coord, Distance, Haversine, LineString, MultiPolygon, Point, Polygon};
use serde_json::Value;

/// Radio medio de la Tierra en metros
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Convertir un GeoJSON Feature (o geometría directa) en un `MultiPolygon`.
///
/// Acepta geometrías `Polygon` y `MultiPolygon`; las coordenadas GeoJSON
/// vienen como `[lng, lat]`. Devuelve `None` si la estructura no es una
/// geometría poligonal válida.
pub fn multipolygon_from_geojson(geojson: &Value) -> Option<MultiPolygon<f64>> {
    let geometry = match geojson.get("geometry") {
        Some(g) => g,
        None => geojson,
    };

    let geom_type = geometry.get("type")?.as_str()?;
    let coordinates = geometry.get("coordinates")?;

    match geom_type {
        "Polygon" => parse_polygon(coordinates).map(|p| MultiPolygon(vec![p])),
        "MultiPolygon" => {
            let polygons: Vec<Polygon<f64>> = coordinates
                .as_array()?
                .iter()
                .filter_map(parse_polygon)
                .collect();
            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon(polygons))
            }
        }
        _ => None,
    }
}

fn parse_polygon(coordinates: &Value) -> Option<Polygon<f64>> {
    let rings = coordinates.as_array()?;
    let mut ring_iter = rings.iter().filter_map(parse_ring);
    let exterior = ring_iter.next()?;
    let interiors: Vec<LineString<f64>> = ring_iter.collect();
    Some(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = ring
        .as_array()?
        .iter()
        .filter_map(|pair| {
            let pair = pair.as_array()?;
            let lng = pair.first()?.as_f64()?;
            let lat = pair.get(1)?.as_f64()?;
            Some(Coord { x: lng, y: lat })
        })
        .collect();
    if coords.len() < 4 {
        return None;
    }
    Some(LineString::from(coords))
}

/// Test de geocerca: ¿el punto (lat, lng) cae dentro del polígono?
pub fn polygon_contains(polygon: &MultiPolygon<f64>, lat: f64, lng: f64) -> bool {
    polygon.contains(&Point::new(lng, lat))
}

/// Área (en grados cuadrados) usada como desempate determinista cuando un
/// punto cae en más de una zona: gana la zona más pequeña.
pub fn polygon_area(polygon: &MultiPolygon<f64>) -> f64 {
    polygon.unsigned_area()
}

/// Distancia haversine entre dos puntos (lat, lng), en metros.
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    Haversine::distance(Point::new(lng1, lat1), Point::new(lng2, lat2))
}

/// Distancia mínima en metros desde un punto a una polilínea de puntos
/// `(lat, lng)`. Proyección local equirectangular centrada en el punto;
/// suficiente a escala urbana. `None` si la polilínea tiene menos de 2 puntos.
pub fn distance_to_polyline_meters(lat: f64, lng: f64, path: &[(f64, f64)]) -> Option<f64> {
    if path.len() < 2 {
        return None;
    }

    let cos_lat = lat.to_radians().cos();
    let to_local = |p_lat: f64, p_lng: f64| -> (f64, f64) {
        let x = (p_lng - lng).to_radians() * EARTH_RADIUS_M * cos_lat;
        let y = (p_lat - lat).to_radians() * EARTH_RADIUS_M;
        (x, y)
    };

    let mut best = f64::MAX;
    for window in path.windows(2) {
        let (ax, ay) = to_local(window[0].0, window[0].1);
        let (bx, by) = to_local(window[1].0, window[1].1);
        let d = point_to_segment(ax, ay, bx, by);
        if d < best {
            best = d;
        }
    }
    Some(best)
}

/// Distancia desde el origen al segmento (a, b) en el plano local.
fn point_to_segment(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (ax * ax + ay * ay).sqrt();
    }
    // Proyección del origen sobre la recta, acotada al segmento
    let t = (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0);
    let px = ax + t * dx;
    let py = ay + t * dy;
    (px * px + py * py).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square_feature(min: f64, max: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [min, min], [max, min], [max, max], [min, max], [min, min]
                ]]
            }
        })
    }

    #[test]
    fn parses_polygon_feature() {
        let polygon = multipolygon_from_geojson(&square_feature(0.0, 1.0)).unwrap();
        assert!(polygon_contains(&polygon, 0.5, 0.5));
        assert!(!polygon_contains(&polygon, 1.5, 0.5));
    }

    #[test]
    fn parses_bare_geometry() {
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
        });
        let polygon = multipolygon_from_geojson(&geometry).unwrap();
        assert!(polygon_contains(&polygon, 1.0, 1.0));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let geometry = json!({ "type": "Point", "coordinates": [1.0, 1.0] });
        assert!(multipolygon_from_geojson(&geometry).is_none());
    }

    #[test]
    fn smaller_square_has_smaller_area() {
        let small = multipolygon_from_geojson(&square_feature(0.0, 1.0)).unwrap();
        let big = multipolygon_from_geojson(&square_feature(0.0, 2.0)).unwrap();
        assert!(polygon_area(&small) < polygon_area(&big));
    }

    #[test]
    fn haversine_known_distance() {
        // Un grado de latitud son ~111.2 km
        let d = haversine_meters(-7.0, 112.0, -6.0, 112.0);
        assert!((d - 111_195.0).abs() < 500.0, "got {}", d);
    }

    #[test]
    fn polyline_distance_perpendicular() {
        // Segmento norte-sur sobre lng 112.0; punto desplazado al este
        let path = vec![(-7.30, 112.0), (-7.20, 112.0)];
        let lat: f64 = -7.25;
        // 50 metros en longitud a esta latitud
        let dlng = 50.0 / (EARTH_RADIUS_M * lat.to_radians().cos()) * (180.0 / std::f64::consts::PI);
        let d = distance_to_polyline_meters(lat, 112.0 + dlng, &path).unwrap();
        assert!((d - 50.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn polyline_distance_on_the_line_is_zero() {
        let path = vec![(-7.30, 112.0), (-7.20, 112.0)];
        let d = distance_to_polyline_meters(-7.25, 112.0, &path).unwrap();
        assert!(d < 0.5, "got {}", d);
    }

    #[test]
    fn polyline_too_short() {
        assert!(distance_to_polyline_meters(0.0, 0.0, &[(1.0, 1.0)]).is_none());
    }
}
