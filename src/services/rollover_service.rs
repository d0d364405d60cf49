//! Rollover diario
//!
//! A las 03:00 de Asia/Jakarta arranca el nuevo día de servicio: se
//! aplican los overrides de `next_day_service` programados por los
//! tutores (incluido el camino directo a `absent`) y el resto de alumnos
//! vuelve a `at_home`. Los overrides consumidos se limpian.

use chrono::{NaiveTime, Utc};
use chrono_tz::Asia::Jakarta;
use sqlx::PgPool;
use tracing::{error, info};

use crate::models::student::{ServicePlan, TripStatus};
use crate::models::trip_log::trip_date_for;
use crate::repositories::student_repository::StudentRepository;
use crate::utils::errors::AppError;

/// Hora local del reset diario
const ROLLOVER_HOUR: u32 = 3;

pub struct RolloverService {
    students: StudentRepository,
}

impl RolloverService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            students: StudentRepository::new(pool),
        }
    }

    /// Ejecutar el reset del día de servicio actual. Devuelve
    /// (overrides aplicados, alumnos reseteados).
    pub async fn run_daily_reset(&self) -> Result<(usize, u64), AppError> {
        let today = trip_date_for(Utc::now());

        let scheduled = self.students.find_with_override_for(today).await?;
        let mut applied = 0usize;

        for student in &scheduled {
            let Some(override_plan) = student.next_day_service.as_ref() else {
                continue;
            };
            let service = ServicePlan {
                pickup: override_plan.pickup,
                dropoff: override_plan.dropoff,
            };
            let status = status_after_override(override_plan.is_absent);
            self.students.apply_override(student.id, &service, status).await?;
            applied += 1;
        }

        let reset = self.students.reset_without_override(today).await?;

        info!(
            "🌅 Rollover diario {}: {} overrides aplicados, {} alumnos reseteados",
            today, applied, reset
        );
        Ok((applied, reset))
    }

    /// Lanzar la tarea de fondo que ejecuta el reset cada día a las 03:00
    /// hora de Jakarta
    pub fn spawn_daily(pool: PgPool) {
        tokio::spawn(async move {
            let service = RolloverService::new(pool);
            loop {
                let wait = duration_until_next_rollover();
                tokio::time::sleep(wait).await;
                if let Err(e) = service.run_daily_reset().await {
                    error!("❌ Rollover diario fallido: {}", e);
                }
            }
        });
    }
}

/// Tiempo hasta las próximas 03:00 en Asia/Jakarta
fn duration_until_next_rollover() -> std::time::Duration {
    let now = Utc::now().with_timezone(&Jakarta);
    let target_time = NaiveTime::from_hms_opt(ROLLOVER_HOUR, 0, 0).unwrap();

    let today_target = now.date_naive().and_time(target_time);
    let next = if now.naive_local() < today_target {
        today_target
    } else {
        (now.date_naive() + chrono::Duration::days(1)).and_time(target_time)
    };

    let seconds = (next - now.naive_local()).num_seconds().max(1) as u64;
    std::time::Duration::from_secs(seconds)
}

/// Estado resultante de un override (parse del lado de scheduling)
pub fn status_after_override(is_absent: bool) -> TripStatus {
    if is_absent {
        TripStatus::Absent
    } else {
        TripStatus::AtHome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollover_wait_is_under_a_day() {
        let wait = duration_until_next_rollover();
        assert!(wait.as_secs() >= 1);
        assert!(wait.as_secs() <= 24 * 3600);
    }

    #[test]
    fn absent_override_goes_straight_to_absent() {
        assert_eq!(status_after_override(true), TripStatus::Absent);
        assert_eq!(status_after_override(false), TripStatus::AtHome);
    }
}
