use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::subscription::{Subscription, SubscriptionKeys};
use crate::utils::errors::AppError;

pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert idempotente: re-suscribir el mismo (usuario, endpoint)
    /// actualiza las claves en vez de duplicar el registro.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        endpoint: &str,
        keys: &SubscriptionKeys,
    ) -> Result<Subscription, AppError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (id, user_id, endpoint, keys, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, endpoint)
            DO UPDATE SET keys = EXCLUDED.keys
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(endpoint)
        .bind(sqlx::types::Json(keys))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(subscription)
    }

    /// Eliminación usada solo por el camino de auto-saneado del fan-out
    /// cuando un endpoint devuelve "gone"
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<Subscription>, AppError> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(subscriptions)
    }
}
