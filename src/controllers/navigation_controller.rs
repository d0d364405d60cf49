use std::sync::Arc;
use uuid::Uuid;

use crate::dto::route_dto::RouteResponse;
use crate::dto::trip_dto::TripType;
use crate::services::RouteService;
use crate::utils::errors::AppError;

pub struct NavigationController {
    routes: Arc<RouteService>,
}

impl NavigationController {
    pub fn new(routes: Arc<RouteService>) -> Self {
        Self { routes }
    }

    /// Ruta vigente del conductor: computa o sirve del cache. Un fallo del
    /// proveedor se propaga: una ruta ausente es visible y accionable para
    /// el usuario.
    pub async fn current_route(
        &self,
        driver_id: Uuid,
        trip_type: TripType,
    ) -> Result<RouteResponse, AppError> {
        self.routes.current_route(driver_id, trip_type, None).await
    }
}
