//! DTOs de tracking y conductores

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Posición reportada por la app del conductor
#[derive(Debug, Deserialize)]
pub struct LocationUpdateRequest {
    pub driver_id: Uuid,
    pub lat: f64,
    pub lng: f64,
}

/// Traspaso de alumnos a un conductor sustituto
#[derive(Debug, Deserialize, Validate)]
pub struct HandoverRequest {
    #[validate(length(min = 1))]
    pub student_ids: Vec<Uuid>,
    pub to_driver_id: Uuid,
}

/// Respuesta del traspaso
#[derive(Debug, Serialize)]
pub struct HandoverResponse {
    pub moved: u64,
    pub zone: String,
}

/// Bootstrap de la pantalla de tracking de un tutor: sus alumnos y los
/// conductores que cubren las zonas de esos alumnos
#[derive(Debug, Serialize)]
pub struct ParentTrackingResponse {
    pub students: Vec<crate::models::student::Student>,
    pub drivers: Vec<crate::models::driver::Driver>,
}
