use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::location_dto::{
    HandoverRequest, HandoverResponse, LocationUpdateRequest, ParentTrackingResponse,
};
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::student_repository::StudentRepository;
use crate::services::location_service::LocationStreamService;
use crate::services::{NotificationFanout, ZoneResolver};
use crate::utils::errors::AppError;
use crate::utils::validation::validate_coordinates;

pub struct DriverController {
    drivers: DriverRepository,
    students: StudentRepository,
    resolver: ZoneResolver,
    fanout: Arc<NotificationFanout>,
    locations: Arc<LocationStreamService>,
}

impl DriverController {
    pub fn new(
        pool: PgPool,
        fanout: Arc<NotificationFanout>,
        locations: Arc<LocationStreamService>,
    ) -> Self {
        Self {
            drivers: DriverRepository::new(pool.clone()),
            students: StudentRepository::new(pool.clone()),
            resolver: ZoneResolver::new(pool),
            fanout,
            locations,
        }
    }

    /// Ingesta de posición del conductor: valida, verifica que el
    /// conductor exista y delega en el stream
    pub async fn record_location(&self, request: LocationUpdateRequest) -> Result<(), AppError> {
        validate_coordinates(request.lat, request.lng).map_err(|_| {
            AppError::BadRequest("latitude and longitude must be valid WGS84 coordinates".to_string())
        })?;

        // Un conductor sin registro debe ver un error explícito, no un
        // broadcast silencioso que nadie puede atribuir
        if self.drivers.find_by_id(request.driver_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "driver '{}' not found; tracking cannot start",
                request.driver_id
            )));
        }

        self.locations
            .publish(request.driver_id, request.lat, request.lng)
            .await
    }

    /// Traspaso de alumnos a un conductor sustituto: mueve las zonas y
    /// avisa al sustituto (fallo de aviso contenido en el reporte)
    pub async fn handover(&self, request: HandoverRequest) -> Result<HandoverResponse, AppError> {
        request.validate()?;

        let to_driver = self
            .drivers
            .find_by_id(request.to_driver_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("substitute driver '{}' not found", request.to_driver_id))
            })?;

        let moved = self
            .students
            .move_to_zone(&request.student_ids, &to_driver.zone)
            .await?;

        let _ = self.fanout.notify_handover(to_driver.id, moved).await;

        Ok(HandoverResponse {
            moved,
            zone: to_driver.zone,
        })
    }

    /// Bootstrap de tracking de un tutor: sus alumnos más los conductores
    /// que cubren las zonas de esos alumnos. Sin hijos registrados ambas
    /// listas van vacías (estado claramente etiquetado, no un error).
    pub async fn parent_tracking(&self, parent_id: Uuid) -> Result<ParentTrackingResponse, AppError> {
        let students = self.students.find_by_parent(parent_id).await?;
        let zones = self.students.distinct_zones_for_parent(parent_id).await?;
        let drivers = self.resolver.drivers_for_zones(&zones).await?;
        Ok(ParentTrackingResponse { students, drivers })
    }
}
