//! Canal realtime (pub/sub)
//!
//! El broker se inyecta en cada componente detrás de traits object-safe,
//! nunca como singleton de paquete, para poder sustituirlo por un bus en
//! memoria en los tests.
//!
//! Convenciones de canales: un canal compartido `tracking-channel` para
//! todas las posiciones de conductores (los clientes filtran por
//! `driver_id`) y un canal privado por tutor para eventos de estado.

pub mod memory_bus;
pub mod redis_bus;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Canal compartido de posiciones en vivo
pub const TRACKING_CHANNEL: &str = "tracking-channel";

/// Canal privado de un tutor para eventos de estado de sus hijos
pub fn parent_channel(user_id: Uuid) -> String {
    format!("private-parent-{}", user_id)
}

/// Mensaje publicado en un canal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub channel: String,
    pub event: String,
    pub data: serde_json::Value,
}

/// Lado de publicación del broker
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Publicar sin esperar confirmación de entrega (at-most-once)
    async fn publish(&self, channel: &str, event: &str, data: serde_json::Value) -> Result<()>;
}

/// Lado de suscripción del broker
#[async_trait::async_trait]
pub trait Subscriber: Send + Sync {
    /// Stream push de larga vida; cancelar es simplemente dejar de leer
    async fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<ChannelMessage>>;
}
