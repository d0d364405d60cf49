use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::zone::Zone;
use crate::utils::errors::AppError;

pub struct ZoneRepository {
    pool: PgPool,
}

impl ZoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<Zone>, AppError> {
        let zones = sqlx::query_as::<_, Zone>("SELECT * FROM zones ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(zones)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Zone>, AppError> {
        let zone = sqlx::query_as::<_, Zone>("SELECT * FROM zones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(zone)
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM zones WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(result.0)
    }

    pub async fn create(&self, name: &str, geojson: serde_json::Value) -> Result<Zone, AppError> {
        let zone = sqlx::query_as::<_, Zone>(
            r#"
            INSERT INTO zones (id, name, geojson, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(sqlx::types::Json(geojson))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(zone)
    }

    pub async fn update_geojson(
        &self,
        id: Uuid,
        geojson: serde_json::Value,
    ) -> Result<Option<Zone>, AppError> {
        let zone = sqlx::query_as::<_, Zone>(
            "UPDATE zones SET geojson = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(sqlx::types::Json(geojson))
        .fetch_optional(&self.pool)
        .await?;
        Ok(zone)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM zones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
