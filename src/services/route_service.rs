//! Motor de rutas
//!
//! Deriva la lista ordenada de waypoints (posición del conductor, alumnos
//! pendientes, colegios destino), pide la polilínea al proveedor, la
//! cachea por checksum de waypoints y detecta cuándo el conductor se
//! desvió lo suficiente como para recalcular. El chequeo de desvío corre
//! con cada LocationEvent del conductor, no con un timer.

use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::redis_client::RedisClient;
use crate::cache::CacheOperations;
use crate::dto::route_dto::RouteResponse;
use crate::dto::trip_dto::TripType;
use crate::models::location::LocationEvent;
use crate::models::point::GeoPoint;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::school_repository::SchoolRepository;
use crate::repositories::student_repository::StudentRepository;
use crate::services::routing_provider::RoutingProvider;
use crate::utils::errors::AppError;
use crate::utils::geo::distance_to_polyline_meters;

/// Umbral de desvío: más lejos que esto de la ruta cacheada invalida la
/// ruta y fuerza un recálculo
pub const DEVIATION_THRESHOLD_METERS: f64 = 50.0;

/// TTL del cache de polilíneas por checksum
const ROUTE_CACHE_TTL_SECS: u64 = 1800;

/// Ruta activa de un conductor. Cada conductor tiene su propia entrada:
/// eventos de conductores distintos nunca se serializan entre sí.
#[derive(Debug, Clone)]
struct ActiveRoute {
    waypoint_key: String,
    trip_type: TripType,
    polyline: Vec<(f64, f64)>,
}

/// Checksum estable de la lista exacta de waypoints serializada
pub fn waypoint_key(waypoints: &[(f64, f64)]) -> String {
    let serialized = serde_json::to_string(waypoints).unwrap_or_default();
    format!("{:x}", md5::compute(serialized))
}

/// Lista ordenada de waypoints `(lat, lng)` para el trip.
///
/// Recogida: `[conductor, alumnos..., colegios...]`; regreso:
/// `[conductor, colegios..., alumnos...]`. Los puntos sin ubicación
/// (centinela 0,0) se excluyen.
pub fn compute_waypoints(
    start: (f64, f64),
    student_points: &[GeoPoint],
    school_points: &[GeoPoint],
    trip_type: TripType,
) -> Vec<(f64, f64)> {
    let students = student_points
        .iter()
        .filter(|p| p.is_set())
        .map(|p| (p.lat(), p.lng()));
    let schools = school_points
        .iter()
        .filter(|p| p.is_set())
        .map(|p| (p.lat(), p.lng()));

    let mut waypoints = vec![start];
    match trip_type {
        TripType::Pickup => {
            waypoints.extend(students);
            waypoints.extend(schools);
        }
        TripType::Dropoff => {
            waypoints.extend(schools);
            waypoints.extend(students);
        }
    }
    waypoints
}

/// Cache y detección de desvío, sin acceso a base de datos
pub struct RouteEngine {
    provider: Arc<dyn RoutingProvider>,
    cache: Arc<dyn CacheOperations>,
    active: RwLock<HashMap<Uuid, ActiveRoute>>,
    threshold_meters: f64,
}

impl RouteEngine {
    pub fn new(provider: Arc<dyn RoutingProvider>, cache: Arc<dyn CacheOperations>) -> Self {
        Self {
            provider,
            cache,
            active: RwLock::new(HashMap::new()),
            threshold_meters: DEVIATION_THRESHOLD_METERS,
        }
    }

    /// Polilínea para la lista exacta de waypoints. Idempotente hasta la
    /// invalidación: la misma lista no vuelve a llamar al proveedor.
    pub async fn route_for_waypoints(
        &self,
        driver_id: Uuid,
        trip_type: TripType,
        waypoints: &[(f64, f64)],
    ) -> Result<Vec<(f64, f64)>, AppError> {
        if waypoints.len() < 2 {
            return Err(AppError::RoutingUnavailable(
                "at least 2 valid waypoints are required".to_string(),
            ));
        }

        let key = waypoint_key(waypoints);

        {
            let active = self.active.read().await;
            if let Some(route) = active.get(&driver_id) {
                if route.waypoint_key == key {
                    return Ok(route.polyline.clone());
                }
            }
        }

        // Cache compartido por checksum (sobrevive reinicios y se comparte
        // entre conductores con waypoints idénticos)
        let cache_key = RedisClient::route_key(&key);
        if let Ok(Some(raw)) = self.cache.get(&cache_key).await {
            if let Ok(polyline) = serde_json::from_str::<Vec<(f64, f64)>>(&raw) {
                self.store_active(driver_id, trip_type, key, polyline.clone()).await;
                return Ok(polyline);
            }
        }

        let wire: Vec<[f64; 2]> = waypoints.iter().map(|(lat, lng)| [*lng, *lat]).collect();
        let coordinates = self.provider.fetch_route(&wire).await?;
        let polyline: Vec<(f64, f64)> = coordinates.iter().map(|[lng, lat]| (*lat, *lng)).collect();

        if let Ok(serialized) = serde_json::to_string(&polyline) {
            if let Err(e) = self.cache.set(&cache_key, &serialized, ROUTE_CACHE_TTL_SECS).await {
                warn!("⚠️ No se pudo cachear la ruta {}: {}", key, e);
            }
        }

        self.store_active(driver_id, trip_type, key, polyline.clone()).await;
        Ok(polyline)
    }

    async fn store_active(
        &self,
        driver_id: Uuid,
        trip_type: TripType,
        waypoint_key: String,
        polyline: Vec<(f64, f64)>,
    ) {
        let mut active = self.active.write().await;
        active.insert(driver_id, ActiveRoute { waypoint_key, trip_type, polyline });
    }

    /// ¿Está el conductor a más del umbral de su ruta activa? Devuelve el
    /// trip de la ruta desviada para que el caller recalcule.
    pub async fn check_deviation(&self, driver_id: Uuid, lat: f64, lng: f64) -> Option<TripType> {
        let active = self.active.read().await;
        let route = active.get(&driver_id)?;
        let distance = distance_to_polyline_meters(lat, lng, &route.polyline)?;
        if distance > self.threshold_meters {
            Some(route.trip_type)
        } else {
            None
        }
    }

    /// Descarta la ruta activa del conductor y su entrada de cache
    pub async fn invalidate(&self, driver_id: Uuid) {
        let removed = {
            let mut active = self.active.write().await;
            active.remove(&driver_id)
        };
        if let Some(route) = removed {
            let cache_key = RedisClient::route_key(&route.waypoint_key);
            if let Err(e) = self.cache.delete(&cache_key).await {
                warn!("⚠️ No se pudo invalidar la ruta cacheada: {}", e);
            }
        }
    }

    /// ¿Tiene este conductor una ruta activa?
    pub async fn has_active_route(&self, driver_id: Uuid) -> bool {
        self.active.read().await.contains_key(&driver_id)
    }
}

/// Orquestación con datos reales: carga conductor, pendientes y colegios
/// y delega en el motor
pub struct RouteService {
    engine: Arc<RouteEngine>,
    drivers: DriverRepository,
    students: StudentRepository,
    schools: SchoolRepository,
}

impl RouteService {
    pub fn new(pool: PgPool, engine: Arc<RouteEngine>) -> Self {
        Self {
            engine,
            drivers: DriverRepository::new(pool.clone()),
            students: StudentRepository::new(pool.clone()),
            schools: SchoolRepository::new(pool),
        }
    }

    /// Ruta vigente del conductor para el trip dado (computa o sirve del
    /// cache). `start_override` es la posición en vivo; sin ella se parte
    /// de la cochera del conductor.
    pub async fn current_route(
        &self,
        driver_id: Uuid,
        trip_type: TripType,
        start_override: Option<(f64, f64)>,
    ) -> Result<RouteResponse, AppError> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("driver '{}' not found", driver_id)))?;

        let pending = self
            .students
            .find_pending(&driver.zone, trip_type.pending_status(), trip_type.service_field())
            .await?;

        let mut seen = HashSet::new();
        let school_ids: Vec<Uuid> = pending
            .iter()
            .map(|s| s.school_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let schools = if school_ids.is_empty() {
            Vec::new()
        } else {
            self.schools.find_by_ids(&school_ids).await?
        };

        let start = match start_override {
            Some(position) => position,
            None if driver.location.is_set() => (driver.location.lat(), driver.location.lng()),
            None => {
                return Err(AppError::RoutingUnavailable(
                    "driver has no known position to start the route from".to_string(),
                ))
            }
        };

        let student_points: Vec<GeoPoint> = pending.iter().map(|s| s.location.0.clone()).collect();
        let school_points: Vec<GeoPoint> = schools.iter().map(|s| s.location.0.clone()).collect();
        let waypoints = compute_waypoints(start, &student_points, &school_points, trip_type);

        let polyline = self
            .engine
            .route_for_waypoints(driver_id, trip_type, &waypoints)
            .await?;

        Ok(RouteResponse {
            driver_id,
            polyline: polyline.iter().map(|(lat, lng)| [*lat, *lng]).collect(),
            waypoint_count: waypoints.len(),
        })
    }

    /// Reacción a un LocationEvent: si el conductor se desvió más del
    /// umbral, la ruta cacheada se descarta y se recalcula partiendo de la
    /// posición actual. Síncrono respecto al evento de ese conductor;
    /// conductores distintos no se bloquean entre sí.
    pub async fn handle_location_event(&self, event: &LocationEvent) {
        let Some(trip_type) = self
            .engine
            .check_deviation(event.driver_id, event.lat, event.lng)
            .await
        else {
            return;
        };

        info!(
            "🔄 Conductor {} fuera de ruta (> {} m): recalculando",
            event.driver_id, DEVIATION_THRESHOLD_METERS
        );
        self.engine.invalidate(event.driver_id).await;

        if let Err(e) = self
            .current_route(event.driver_id, trip_type, Some((event.lat, event.lng)))
            .await
        {
            // El fallo de recálculo no tumba el stream de posiciones; la
            // próxima consulta de ruta lo propagará al caller
            warn!("⚠️ Recalculo de ruta fallido para {}: {}", event.driver_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Proveedor fake: devuelve una polilínea fija y cuenta llamadas
    struct FakeProvider {
        calls: AtomicUsize,
        polyline: Vec<[f64; 2]>,
    }

    impl FakeProvider {
        fn straight_segment() -> Self {
            // Segmento norte-sur sobre lng 112.0 en pares [lng, lat]
            Self {
                calls: AtomicUsize::new(0),
                polyline: vec![[112.0, -7.30], [112.0, -7.20]],
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RoutingProvider for FakeProvider {
        async fn fetch_route(&self, _points: &[[f64; 2]]) -> Result<Vec<[f64; 2]>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.polyline.clone())
        }
    }

    fn engine_with(provider: Arc<FakeProvider>) -> RouteEngine {
        RouteEngine::new(provider, Arc::new(MemoryCache::new()))
    }

    fn test_waypoints() -> Vec<(f64, f64)> {
        vec![(-7.30, 112.0), (-7.25, 112.01), (-7.20, 112.0)]
    }

    /// Desplazamiento en longitud equivalente a `meters` a la latitud dada
    fn meters_east(lat: f64, meters: f64) -> f64 {
        meters / (6_371_000.0 * lat.to_radians().cos()) * (180.0 / std::f64::consts::PI)
    }

    #[tokio::test]
    async fn identical_waypoints_hit_cache_and_call_provider_once() {
        let provider = Arc::new(FakeProvider::straight_segment());
        let engine = engine_with(provider.clone());
        let driver = Uuid::new_v4();
        let waypoints = test_waypoints();

        let first = engine
            .route_for_waypoints(driver, TripType::Pickup, &waypoints)
            .await
            .unwrap();
        let second = engine
            .route_for_waypoints(driver, TripType::Pickup, &waypoints)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn changed_waypoints_trigger_new_provider_call() {
        let provider = Arc::new(FakeProvider::straight_segment());
        let engine = engine_with(provider.clone());
        let driver = Uuid::new_v4();

        engine
            .route_for_waypoints(driver, TripType::Pickup, &test_waypoints())
            .await
            .unwrap();
        let mut other = test_waypoints();
        other[0] = (-7.31, 112.0);
        engine
            .route_for_waypoints(driver, TripType::Pickup, &other)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn too_few_waypoints_is_routing_unavailable() {
        let provider = Arc::new(FakeProvider::straight_segment());
        let engine = engine_with(provider.clone());

        let result = engine
            .route_for_waypoints(Uuid::new_v4(), TripType::Pickup, &[(-7.3, 112.0)])
            .await;

        assert!(matches!(result, Err(AppError::RoutingUnavailable(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn deviation_is_triggered_just_past_the_threshold() {
        let provider = Arc::new(FakeProvider::straight_segment());
        let engine = engine_with(provider.clone());
        let driver = Uuid::new_v4();
        engine
            .route_for_waypoints(driver, TripType::Pickup, &test_waypoints())
            .await
            .unwrap();

        let lat = -7.25;
        // A 49 m de la ruta: sin recálculo
        let near = 112.0 + meters_east(lat, 49.0);
        assert_eq!(engine.check_deviation(driver, lat, near).await, None);

        // A 51 m: desvío detectado
        let far = 112.0 + meters_east(lat, 51.0);
        assert_eq!(
            engine.check_deviation(driver, lat, far).await,
            Some(TripType::Pickup)
        );
    }

    #[tokio::test]
    async fn invalidation_forces_recompute_for_same_waypoints() {
        let provider = Arc::new(FakeProvider::straight_segment());
        let engine = engine_with(provider.clone());
        let driver = Uuid::new_v4();
        let waypoints = test_waypoints();

        engine
            .route_for_waypoints(driver, TripType::Pickup, &waypoints)
            .await
            .unwrap();
        engine.invalidate(driver).await;
        assert!(!engine.has_active_route(driver).await);

        engine
            .route_for_waypoints(driver, TripType::Pickup, &waypoints)
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn drivers_have_independent_route_entries() {
        let provider = Arc::new(FakeProvider::straight_segment());
        let engine = engine_with(provider.clone());
        let driver_a = Uuid::new_v4();
        let driver_b = Uuid::new_v4();
        let mut waypoints_b = test_waypoints();
        waypoints_b[1] = (-7.26, 112.02);

        engine
            .route_for_waypoints(driver_a, TripType::Pickup, &test_waypoints())
            .await
            .unwrap();
        engine
            .route_for_waypoints(driver_b, TripType::Dropoff, &waypoints_b)
            .await
            .unwrap();

        // Invalidar a uno no toca la ruta activa del otro
        engine.invalidate(driver_a).await;
        assert!(!engine.has_active_route(driver_a).await);
        assert!(engine.has_active_route(driver_b).await);
        assert_eq!(
            engine.check_deviation(driver_b, -7.25, 112.0).await,
            None
        );
    }

    #[test]
    fn pickup_orders_students_before_schools() {
        let start = (-7.30, 112.0);
        let students = vec![GeoPoint::new(-7.28, 112.01), GeoPoint::new(-7.27, 112.02)];
        let schools = vec![GeoPoint::new(-7.20, 112.05)];

        let waypoints = compute_waypoints(start, &students, &schools, TripType::Pickup);
        assert_eq!(
            waypoints,
            vec![(-7.30, 112.0), (-7.28, 112.01), (-7.27, 112.02), (-7.20, 112.05)]
        );
    }

    #[test]
    fn dropoff_orders_schools_before_students() {
        let start = (-7.20, 112.05);
        let students = vec![GeoPoint::new(-7.28, 112.01)];
        let schools = vec![GeoPoint::new(-7.21, 112.04)];

        let waypoints = compute_waypoints(start, &students, &schools, TripType::Dropoff);
        assert_eq!(
            waypoints,
            vec![(-7.20, 112.05), (-7.21, 112.04), (-7.28, 112.01)]
        );
    }

    #[test]
    fn sentinel_locations_are_excluded_from_waypoints() {
        let start = (-7.30, 112.0);
        let students = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(-7.28, 112.01)];
        let schools = vec![GeoPoint::new(0.0, 0.0)];

        let waypoints = compute_waypoints(start, &students, &schools, TripType::Pickup);
        assert_eq!(waypoints, vec![(-7.30, 112.0), (-7.28, 112.01)]);
    }

    #[test]
    fn waypoint_key_is_stable_and_order_sensitive() {
        let a = vec![(-7.3, 112.0), (-7.2, 112.1)];
        let b = vec![(-7.2, 112.1), (-7.3, 112.0)];
        assert_eq!(waypoint_key(&a), waypoint_key(&a));
        assert_ne!(waypoint_key(&a), waypoint_key(&b));
    }
}
