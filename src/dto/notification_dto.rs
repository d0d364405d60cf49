//! DTOs de notificaciones

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::trip_dto::TripType;

/// Payload que recibe el proveedor de entrega push
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: "/logo192.png".to_string(),
        }
    }
}

/// Broadcast del admin a conductores, opcionalmente filtrado a una zona
#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(length(min = 1))]
    pub message: String,
    /// `None` o `"all"` significa todos los conductores
    pub target_zone: Option<String>,
}

/// Aviso de emergencia de un conductor a los tutores de los alumnos que
/// lleva a bordo en este momento
#[derive(Debug, Deserialize, Validate)]
pub struct EmergencyRequest {
    pub driver_id: Uuid,
    #[validate(length(min = 1))]
    pub message: String,
    pub trip_type: TripType,
}

/// Petición de conductor sustituto dirigida a los admins
#[derive(Debug, Deserialize, Validate)]
pub struct RequestChangeRequest {
    pub driver_id: Uuid,
    #[validate(length(min = 1))]
    pub reason: String,
}

/// Resumen agregado de un fan-out: nunca un error por endpoint
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct DeliveryReport {
    /// Endpoints a los que se intentó entregar
    pub attempted: usize,
    /// Entregas aceptadas por el proveedor
    pub delivered: usize,
    /// Fallos transitorios (registrados y descartados, sin reintento)
    pub failed: usize,
    /// Suscripciones muertas eliminadas por auto-saneado (HTTP 410)
    pub expired_removed: usize,
}

impl DeliveryReport {
    pub fn merge(&mut self, other: &DeliveryReport) {
        self.attempted += other.attempted;
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.expired_removed += other.expired_removed;
    }
}
