use std::sync::Arc;
use validator::Validate;

use crate::dto::notification_dto::{
    BroadcastRequest, DeliveryReport, EmergencyRequest, RequestChangeRequest,
};
use crate::services::NotificationFanout;
use crate::utils::errors::AppError;

pub struct NotificationController {
    fanout: Arc<NotificationFanout>,
}

impl NotificationController {
    pub fn new(fanout: Arc<NotificationFanout>) -> Self {
        Self { fanout }
    }

    /// Broadcast del admin a todos los conductores o a los de una zona
    pub async fn broadcast(&self, request: BroadcastRequest) -> Result<DeliveryReport, AppError> {
        request.validate()?;
        self.fanout
            .broadcast_to_drivers(request.target_zone.as_deref(), &request.message)
            .await
    }

    /// Emergencia de un conductor a los tutores con hijos en tránsito
    pub async fn emergency(
        &self,
        request: EmergencyRequest,
    ) -> Result<(DeliveryReport, usize), AppError> {
        request.validate()?;
        self.fanout
            .emergency_to_parents(request.driver_id, request.trip_type, &request.message)
            .await
    }

    /// Petición de sustituto hacia los admins
    pub async fn request_change(
        &self,
        request: RequestChangeRequest,
    ) -> Result<DeliveryReport, AppError> {
        request.validate()?;
        self.fanout
            .request_substitute(request.driver_id, &request.reason)
            .await
    }
}
