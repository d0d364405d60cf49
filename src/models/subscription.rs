//! Modelo de Subscription
//!
//! Registro de endpoints de notificación push. Clave única
//! (user_id, endpoint) para permitir varios dispositivos por usuario.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Claves criptográficas del endpoint push del navegador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Subscription principal - mapea exactamente a la tabla subscriptions
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub keys: Json<SubscriptionKeys>,
    pub created_at: DateTime<Utc>,
}
