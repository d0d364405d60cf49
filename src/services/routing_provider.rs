//! Proveedor externo de rutas (GraphHopper)
//!
//! Este módulo maneja la comunicación con la API de routing: se le envía
//! la lista ordenada de waypoints y devuelve la polilínea decodificada.
//! Cualquier estado no-2xx o body malformado es un fallo del proveedor.

use reqwest::Client;
use std::time::Duration;

use crate::dto::route_dto::{RoutingProviderRequest, RoutingProviderResponse};
use crate::utils::errors::AppError;

/// Proveedor de rutas consumido como caja negra waypoints → polilínea.
/// Los puntos entran y salen como pares `[lng, lat]`.
#[async_trait::async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn fetch_route(&self, points: &[[f64; 2]]) -> Result<Vec<[f64; 2]>, AppError>;
}

pub struct GraphHopperClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GraphHopperClient {
    pub fn new(base_url: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url, api_key }
    }
}

#[async_trait::async_trait]
impl RoutingProvider for GraphHopperClient {
    async fn fetch_route(&self, points: &[[f64; 2]]) -> Result<Vec<[f64; 2]>, AppError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::RoutingUnavailable("routing provider is not configured".to_string())
        })?;

        let url = format!("{}?key={}", self.base_url, api_key);
        let request = RoutingProviderRequest::car(points.to_vec());

        log::info!("🗺️ Solicitando ruta al proveedor para {} waypoints", points.len());

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("User-Agent", "ShuttleDispatch/1.0")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RoutingUnavailable(format!("provider unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RoutingUnavailable(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let parsed: RoutingProviderResponse = response
            .json()
            .await
            .map_err(|e| AppError::RoutingUnavailable(format!("malformed provider response: {}", e)))?;

        let path = parsed.paths.into_iter().next().ok_or_else(|| {
            AppError::RoutingUnavailable("provider returned no paths".to_string())
        })?;

        log::info!(
            "📡 Ruta recibida: {:.0} m, {} s, {} puntos",
            path.distance,
            path.time / 1000,
            path.points.coordinates.len()
        );
        Ok(path.points.coordinates)
    }
}
