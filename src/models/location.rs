//! Evento de ubicación
//!
//! Efímero: solo existe en tránsito por el canal de tracking, nunca se
//! persiste.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Posición puntual de un conductor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEvent {
    pub driver_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationEvent {
    pub fn new(driver_id: Uuid, lat: f64, lng: f64, timestamp: DateTime<Utc>) -> Self {
        Self { driver_id, lat, lng, timestamp }
    }
}
