//! Modelo de Driver
//!
//! Un conductor está asignado a lo sumo a una zona (campo `zone` por nombre);
//! `location` es la cochera, no la posición en vivo.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::point::GeoPoint;

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub vehicle: String,
    pub zone: String,
    pub location: Json<GeoPoint>,
    pub created_at: DateTime<Utc>,
}
