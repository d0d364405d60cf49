use sqlx::PgPool;
use uuid::Uuid;

use crate::models::school::School;
use crate::utils::errors::AppError;

pub struct SchoolRepository {
    pool: PgPool,
}

impl SchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<School>, AppError> {
        let schools = sqlx::query_as::<_, School>(
            "SELECT * FROM schools WHERE id = ANY($1) ORDER BY name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(schools)
    }
}
