use sqlx::PgPool;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::utils::errors::AppError;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(driver)
    }

    /// Conductor asignado a una zona (a lo sumo uno por regla de negocio;
    /// si hubiera más se toma el más antiguo, de forma estable)
    pub async fn find_by_zone(&self, zone: &str) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE zone = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(zone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(driver)
    }

    pub async fn find_by_zones(&self, zones: &[String]) -> Result<Vec<Driver>, AppError> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE zone = ANY($1) ORDER BY name",
        )
        .bind(zones)
        .fetch_all(&self.pool)
        .await?;
        Ok(drivers)
    }

    pub async fn find_all(&self) -> Result<Vec<Driver>, AppError> {
        let drivers = sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(drivers)
    }
}
