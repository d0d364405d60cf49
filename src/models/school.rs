//! Modelo de School

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::point::GeoPoint;

/// School principal - mapea exactamente a la tabla schools
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: Json<GeoPoint>,
    pub created_at: DateTime<Utc>,
}
