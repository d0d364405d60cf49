use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::student::{GeneralStatus, ServicePlan, Student, TripStatus};
use crate::utils::errors::AppError;

pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    pub async fn find_by_parent(&self, parent_id: Uuid) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE parent_id = $1 ORDER BY name",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    /// Zonas distintas de los hijos de un tutor
    pub async fn distinct_zones_for_parent(&self, parent_id: Uuid) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT zone FROM students WHERE parent_id = $1")
                .bind(parent_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(zone,)| zone).collect())
    }

    /// Alumnos activos de una zona pendientes para el trip indicado:
    /// `at_home` con servicio de recogida, o `at_school` con servicio de
    /// regreso.
    pub async fn find_pending(
        &self,
        zone: &str,
        pending_status: TripStatus,
        service_field: &str,
    ) -> Result<Vec<Student>, AppError> {
        // service_field viene de TripType, nunca de entrada externa
        let query = match service_field {
            "pickup" => {
                r#"
                SELECT * FROM students
                WHERE zone = $1
                  AND general_status = $2
                  AND trip_status = $3
                  AND (service ->> 'pickup')::boolean = TRUE
                ORDER BY name
                "#
            }
            _ => {
                r#"
                SELECT * FROM students
                WHERE zone = $1
                  AND general_status = $2
                  AND trip_status = $3
                  AND (service ->> 'dropoff')::boolean = TRUE
                ORDER BY name
                "#
            }
        };
        let students = sqlx::query_as::<_, Student>(query)
            .bind(zone)
            .bind(GeneralStatus::Active.as_str())
            .bind(pending_status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    /// Snapshot de alumnos de una zona en un estado de viaje concreto
    /// (para el broadcast de emergencia)
    pub async fn find_in_transit(
        &self,
        zone: &str,
        status: TripStatus,
    ) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE zone = $1 AND trip_status = $2",
        )
        .bind(zone)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    /// Compare-and-swap del estado de viaje. Devuelve false si otro writer
    /// ganó la carrera (el estado persistido ya no es `expected`).
    pub async fn cas_trip_status(
        &self,
        id: Uuid,
        expected: TripStatus,
        new: TripStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE students SET trip_status = $3 WHERE id = $1 AND trip_status = $2",
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(new.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Mover un conjunto de alumnos a otra zona (handover a conductor
    /// sustituto). Devuelve cuántos se movieron.
    pub async fn move_to_zone(&self, ids: &[Uuid], zone: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE students SET zone = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(zone)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Alumnos con override de horario para la fecha dada
    pub async fn find_with_override_for(&self, date: NaiveDate) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE (next_day_service ->> 'date')::date = $1",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    /// Aplicar el override consumido: nuevo plan de servicio, estado
    /// resultante y limpieza del override
    pub async fn apply_override(
        &self,
        id: Uuid,
        service: &ServicePlan,
        trip_status: TripStatus,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE students
            SET service = $2, trip_status = $3, next_day_service = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sqlx::types::Json(service))
        .bind(trip_status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reset diario del resto de alumnos (sin override para la fecha):
    /// todos vuelven a `at_home`. Devuelve cuántos cambiaron.
    pub async fn reset_without_override(&self, date: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET trip_status = 'at_home'
            WHERE next_day_service IS NULL
               OR (next_day_service ->> 'date')::date <> $1
            "#,
        )
        .bind(date)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
