use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::trip_log::{TripEvent, TripLog};
use crate::utils::errors::AppError;

pub struct TripLogRepository {
    pool: PgPool,
}

impl TripLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert-with-push atómico de la bitácora del día.
    ///
    /// Si no existe documento para (alumno, fecha) se crea con el conductor
    /// y el primer evento; si existe, el evento se concatena al array JSONB
    /// en la misma sentencia. Dos escritores concurrentes sobre la misma
    /// clave no pierden eventos: el conflicto de la clave única degrada la
    /// segunda inserción a un append.
    pub async fn append_event(
        &self,
        student_id: Uuid,
        trip_date: NaiveDate,
        driver_id: Option<Uuid>,
        status: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<TripLog, AppError> {
        let event = TripEvent {
            status: status.to_string(),
            timestamp,
        };

        let log = sqlx::query_as::<_, TripLog>(
            r#"
            INSERT INTO trip_logs (id, student_id, driver_id, trip_date, events)
            VALUES ($1, $2, $3, $4, jsonb_build_array($5::jsonb))
            ON CONFLICT (student_id, trip_date)
            DO UPDATE SET events = trip_logs.events || $5::jsonb
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(driver_id)
        .bind(trip_date)
        .bind(sqlx::types::Json(&event))
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn find_by_driver(&self, driver_id: Uuid, limit: i64) -> Result<Vec<TripLog>, AppError> {
        let logs = sqlx::query_as::<_, TripLog>(
            "SELECT * FROM trip_logs WHERE driver_id = $1 ORDER BY trip_date DESC LIMIT $2",
        )
        .bind(driver_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    pub async fn find_by_students(
        &self,
        student_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<TripLog>, AppError> {
        let logs = sqlx::query_as::<_, TripLog>(
            "SELECT * FROM trip_logs WHERE student_id = ANY($1) ORDER BY trip_date DESC LIMIT $2",
        )
        .bind(student_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
