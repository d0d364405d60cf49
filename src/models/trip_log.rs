//! Modelo de TripLog
//!
//! Bitácora append-only: un documento por (alumno, día calendario local).
//! El límite de día se calcula en Asia/Jakarta, no en UTC — regla de
//! negocio para un servicio de una sola región.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Jakarta;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Evento individual dentro de la bitácora del día
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEvent {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// TripLog principal - mapea exactamente a la tabla trip_logs
///
/// `driver_id` puede ser NULL: si la zona del alumno no tiene conductor
/// asignado la bitácora se escribe igual (éxito parcial).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripLog {
    pub id: Uuid,
    pub student_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub trip_date: NaiveDate,
    pub events: Json<Vec<TripEvent>>,
}

/// Día calendario del servicio para un instante dado (medianoche local
/// de Asia/Jakarta).
pub fn trip_date_for(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Jakarta).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_boundary_is_jakarta_midnight() {
        // 20:00 UTC del día 1 ya es día 2 en Jakarta (UTC+7)
        let late_utc = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        assert_eq!(trip_date_for(late_utc), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        // 10:00 UTC del día 1 sigue siendo día 1 en Jakarta
        let morning_utc = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(trip_date_for(morning_utc), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
