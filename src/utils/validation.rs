//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de entrada: coordenadas, endpoints de push y claves de suscripción.

use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Endpoint de push: URL https absoluta
    static ref PUSH_ENDPOINT_RE: Regex =
        Regex::new(r"^https://[A-Za-z0-9.-]+(:\d+)?(/[^\s]*)?$").unwrap();
}

/// Validar un par de coordenadas WGS84
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !lat.is_finite() || !lng.is_finite() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        let mut error = ValidationError::new("coordinates");
        error.add_param("lat".into(), &lat);
        error.add_param("lng".into(), &lng);
        return Err(error);
    }
    Ok(())
}

/// Validar el endpoint de una suscripción push
pub fn validate_push_endpoint(endpoint: &str) -> Result<(), ValidationError> {
    if !PUSH_ENDPOINT_RE.is_match(endpoint) {
        let mut error = ValidationError::new("push_endpoint");
        error.add_param("endpoint".into(), &endpoint.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una clave de suscripción sea base64url decodificable
pub fn validate_subscription_key(value: &str) -> Result<(), ValidationError> {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    if value.is_empty() || engine.decode(value.trim_end_matches('=')).is_err() {
        let mut error = ValidationError::new("subscription_key");
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_in_range() {
        assert!(validate_coordinates(-7.25, 112.75).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn push_endpoint_must_be_https() {
        assert!(validate_push_endpoint("https://fcm.googleapis.com/fcm/send/abc123").is_ok());
        assert!(validate_push_endpoint("http://example.com/push").is_err());
        assert!(validate_push_endpoint("not a url").is_err());
    }

    #[test]
    fn subscription_key_is_base64url() {
        assert!(validate_subscription_key("BN4GvZtEZiZuqFxSKVZfSfluS4MFEIAVCW2DCErKyx0").is_ok());
        assert!(validate_subscription_key("").is_err());
        assert!(validate_subscription_key("%%%not-base64%%%").is_err());
    }
}
