use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::zone_dto::{CreateZoneRequest, ResolvedZoneResponse, UpdateZoneRequest};
use crate::models::zone::Zone;
use crate::repositories::zone_repository::ZoneRepository;
use crate::services::ZoneResolver;
use crate::utils::errors::{bad_request_error, conflict_error, not_found_error, AppError};
use crate::utils::geo::multipolygon_from_geojson;
use crate::utils::validation::validate_coordinates;

pub struct ZoneController {
    repository: ZoneRepository,
    resolver: ZoneResolver,
}

impl ZoneController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ZoneRepository::new(pool.clone()),
            resolver: ZoneResolver::new(pool),
        }
    }

    pub async fn list(&self) -> Result<Vec<Zone>, AppError> {
        self.repository.find_all().await
    }

    pub async fn create(&self, request: CreateZoneRequest) -> Result<Zone, AppError> {
        request.validate()?;

        // La geometría debe ser poligonal antes de entrar al resolver
        if multipolygon_from_geojson(&request.geojson).is_none() {
            return Err(bad_request_error(
                "geojson must contain a Polygon or MultiPolygon geometry",
            ));
        }

        if self.repository.name_exists(&request.name).await? {
            return Err(conflict_error("zone", "name", &request.name));
        }

        self.repository.create(&request.name, request.geojson).await
    }

    pub async fn update_geometry(
        &self,
        id: Uuid,
        request: UpdateZoneRequest,
    ) -> Result<Zone, AppError> {
        if multipolygon_from_geojson(&request.geojson).is_none() {
            return Err(bad_request_error(
                "geojson must contain a Polygon or MultiPolygon geometry",
            ));
        }

        self.repository
            .update_geojson(id, request.geojson)
            .await?
            .ok_or_else(|| not_found_error("zone", &id.to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("zone", &id.to_string()));
        }
        Ok(())
    }

    /// Resolver zona y conductor por coordenadas. Un punto fuera de toda
    /// zona devuelve `None`: es control de flujo normal, no un error.
    pub async fn resolve(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<ResolvedZoneResponse>, AppError> {
        validate_coordinates(lat, lng).map_err(|_| {
            AppError::BadRequest("latitude and longitude must be valid WGS84 coordinates".to_string())
        })?;

        let resolved = self.resolver.resolve_zone(lat, lng).await?;
        Ok(resolved.map(|(zone, driver)| ResolvedZoneResponse { zone, driver }))
    }
}
