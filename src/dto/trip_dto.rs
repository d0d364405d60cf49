//! DTOs de viajes y del ciclo diario

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::student::TripStatus;
use crate::models::trip_log::TripEvent;

/// Tipo de trip en curso: recogida matinal o regreso vespertino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Pickup,
    Dropoff,
}

impl TripType {
    /// Estado de los alumnos aún pendientes de subir para este trip
    pub fn pending_status(self) -> TripStatus {
        match self {
            TripType::Pickup => TripStatus::AtHome,
            TripType::Dropoff => TripStatus::AtSchool,
        }
    }

    /// Estado "en tránsito" usado como snapshot del broadcast de emergencia
    pub fn in_transit_status(self) -> TripStatus {
        match self {
            TripType::Pickup => TripStatus::PickedUp,
            TripType::Dropoff => TripStatus::AtSchool,
        }
    }

    /// Campo del plan de servicio que habilita este trip
    pub fn service_field(self) -> &'static str {
        match self {
            TripType::Pickup => "pickup",
            TripType::Dropoff => "dropoff",
        }
    }
}

/// Request de cambio de estado de un alumno
#[derive(Debug, Deserialize)]
pub struct TripTransitionRequest {
    pub status: String,
}

/// Resultado de una transición aplicada
#[derive(Debug, Serialize)]
pub struct TripTransitionResponse {
    pub student_id: Uuid,
    pub status: TripStatus,
    pub event: TripEvent,
    /// false cuando el tutor no pudo resolverse o ninguna entrega llegó;
    /// la transición sigue siendo válida
    pub notified: bool,
}

/// Entrada de historial para las pantallas de reportes
#[derive(Debug, Serialize)]
pub struct TripHistoryEntry {
    pub student_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub trip_date: chrono::NaiveDate,
    pub events: Vec<TripEvent>,
}
