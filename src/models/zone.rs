//! Modelo de Zone
//!
//! Una zona es un polígono geográfico con nombre único; el campo `geojson`
//! guarda el Feature completo tal como lo dibuja el admin.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Zone principal - mapea exactamente a la tabla zones
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub geojson: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
