//! Stream de ubicaciones en vivo
//!
//! Recibe posiciones de conductores y las re-publica en el canal de
//! tracking compartido; todos los suscriptores reciben todas las
//! posiciones y filtran por `driver_id` del lado del cliente. Sin
//! backpressure, entrega at-most-once.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::models::location::LocationEvent;
use crate::realtime::{ChannelMessage, Publisher, Subscriber, TRACKING_CHANNEL};
use crate::services::route_service::RouteService;
use crate::utils::errors::AppError;

pub struct LocationStreamService {
    publisher: Arc<dyn Publisher>,
    subscriber: Arc<dyn Subscriber>,
    routes: Arc<RouteService>,
}

impl LocationStreamService {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        subscriber: Arc<dyn Subscriber>,
        routes: Arc<RouteService>,
    ) -> Self {
        Self { publisher, subscriber, routes }
    }

    /// Ingesta de una posición: broadcast fire-and-forget al canal de
    /// tracking y chequeo de desvío síncrono para ese conductor.
    pub async fn publish(&self, driver_id: Uuid, lat: f64, lng: f64) -> Result<(), AppError> {
        let event = LocationEvent::new(driver_id, lat, lng, Utc::now());

        let data = serde_json::to_value(&event)
            .map_err(|e| AppError::Internal(format!("serializing location event: {}", e)))?;
        if let Err(e) = self.publisher.publish(TRACKING_CHANNEL, "location-update", data).await {
            // El broadcast es best-effort: un broker caído no corta la
            // ingesta ni el chequeo de desvío
            warn!("⚠️ Publish de ubicación fallido para {}: {}", driver_id, e);
        }

        self.routes.handle_location_event(&event).await;
        Ok(())
    }

    /// Stream push del canal de tracking; cancelar es dejar de leer
    pub async fn subscribe_tracking(&self) -> Result<mpsc::Receiver<ChannelMessage>, AppError> {
        self.subscriber
            .subscribe(TRACKING_CHANNEL)
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("tracking channel: {}", e)))
    }
}
