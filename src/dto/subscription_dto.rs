//! DTOs de suscripciones push

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Claves del endpoint tal como las entrega el navegador
#[derive(Debug, Deserialize, Validate)]
pub struct SubscriptionKeysDto {
    #[validate(custom = "crate::utils::validation::validate_subscription_key")]
    pub p256dh: String,
    #[validate(custom = "crate::utils::validation::validate_subscription_key")]
    pub auth: String,
}

/// Request de alta/renovación de suscripción
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    pub user_id: Uuid,
    #[validate(custom = "crate::utils::validation::validate_push_endpoint")]
    pub endpoint: String,
    #[validate]
    pub keys: SubscriptionKeysDto,
}
