use sqlx::PgPool;
use validator::Validate;

use crate::dto::subscription_dto::SubscribeRequest;
use crate::models::subscription::{Subscription, SubscriptionKeys};
use crate::repositories::subscription_repository::SubscriptionRepository;
use crate::utils::errors::AppError;

pub struct SubscriptionController {
    repository: SubscriptionRepository,
}

impl SubscriptionController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SubscriptionRepository::new(pool),
        }
    }

    /// Alta idempotente: el mismo (usuario, endpoint) actualiza claves
    pub async fn subscribe(&self, request: SubscribeRequest) -> Result<Subscription, AppError> {
        request.validate()?;

        let keys = SubscriptionKeys {
            p256dh: request.keys.p256dh,
            auth: request.keys.auth,
        };
        self.repository
            .upsert(request.user_id, &request.endpoint, &keys)
            .await
    }
}
