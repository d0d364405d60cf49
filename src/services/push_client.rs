//! Cliente del proveedor de entrega push
//!
//! El proveedor se consume detrás de un trait para poder sustituirlo por
//! un fake en los tests. Una respuesta "gone" (404/410) es una señal
//! terminal distinta de un fallo transitorio: dispara el auto-saneado.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::dto::notification_dto::PushPayload;
use crate::models::subscription::Subscription;

/// Fallo de entrega a un endpoint individual
#[derive(Error, Debug)]
pub enum PushError {
    /// El endpoint dejó de existir: la suscripción debe eliminarse
    #[error("subscription endpoint is gone")]
    Gone,

    /// Cualquier otro fallo: se registra y se descarta, sin reintento
    #[error("push delivery failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
pub trait PushClient: Send + Sync {
    async fn deliver(&self, subscription: &Subscription, payload: &PushPayload)
        -> Result<(), PushError>;
}

/// Implementación HTTP real contra el endpoint de cada suscripción
pub struct HttpPushClient {
    client: Client,
}

impl HttpPushClient {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait::async_trait]
impl PushClient for HttpPushClient {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<(), PushError> {
        let response = self
            .client
            .post(&subscription.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Push-P256DH", &subscription.keys.p256dh)
            .header("X-Push-Auth", &subscription.keys.auth)
            .json(payload)
            .send()
            .await
            .map_err(|e| PushError::Failed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::GONE || status == reqwest::StatusCode::NOT_FOUND {
            return Err(PushError::Gone);
        }
        if !status.is_success() {
            return Err(PushError::Failed(format!("push endpoint returned {}", status)));
        }
        Ok(())
    }
}
