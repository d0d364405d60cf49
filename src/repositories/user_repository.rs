use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{Role, User};
use crate::utils::errors::AppError;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cuenta asociada a un perfil (conductor o tutor) con el rol dado
    pub async fn find_by_profile(
        &self,
        profile_id: Uuid,
        role: Role,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE profile_id = $1 AND role = $2",
        )
        .bind(profile_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_profiles(
        &self,
        profile_ids: &[Uuid],
        role: Role,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE profile_id = ANY($1) AND role = $2",
        )
        .bind(profile_ids)
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn find_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}
