//! Máquina de estados de viaje
//!
//! Valida y aplica transiciones de estado de alumnos, escribe la bitácora
//! del día y dispara la notificación al tutor. La transición es la única
//! operación que falla duro; la bitácora con conductor nulo es éxito
//! parcial y el fallo de notificación queda contenido.

use chrono::Utc;
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::trip_dto::{TripHistoryEntry, TripTransitionResponse};
use crate::models::student::{Student, TripStatus};
use crate::models::trip_log::{trip_date_for, TripEvent};
use crate::realtime::{parent_channel, Publisher};
use crate::repositories::student_repository::StudentRepository;
use crate::repositories::trip_log_repository::TripLogRepository;
use crate::services::notification_service::NotificationFanout;
use crate::services::zone_resolver::ZoneResolver;
use crate::utils::errors::AppError;

pub struct TripStateMachine {
    students: StudentRepository,
    trip_logs: TripLogRepository,
    resolver: ZoneResolver,
    fanout: Arc<NotificationFanout>,
    publisher: Arc<dyn Publisher>,
}

impl TripStateMachine {
    pub fn new(pool: PgPool, fanout: Arc<NotificationFanout>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            students: StudentRepository::new(pool.clone()),
            trip_logs: TripLogRepository::new(pool.clone()),
            resolver: ZoneResolver::new(pool),
            fanout,
            publisher,
        }
    }

    /// Aplicar una transición de estado solicitada para un alumno.
    ///
    /// La transición se valida contra la tabla y se persiste con un
    /// compare-and-swap: si otro writer cambió el estado entre la lectura
    /// y el update, la petición se rechaza como transición inválida en vez
    /// de pisar el historial.
    pub async fn apply_transition(
        &self,
        student_id: Uuid,
        requested: &str,
    ) -> Result<TripTransitionResponse, AppError> {
        let new_status = TripStatus::from_str(requested)
            .map_err(|e| AppError::BadRequest(e))?;

        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("student '{}' not found", student_id)))?;

        let current = student
            .trip_status()
            .map_err(|e| AppError::Internal(format!("persisted trip status: {}", e)))?;

        if !current.can_transition_to(new_status) {
            return Err(AppError::InvalidTransition(format!(
                "cannot move student '{}' from '{}' to '{}'",
                student.name, current, new_status
            )));
        }

        if !self.students.cas_trip_status(student_id, current, new_status).await? {
            return Err(AppError::InvalidTransition(format!(
                "student '{}' was updated concurrently; transition to '{}' is stale",
                student.name, new_status
            )));
        }

        let timestamp = Utc::now();
        let trip_date = trip_date_for(timestamp);

        // Conductor por la zona del alumno; sin conductor la bitácora se
        // escribe igual con referencia nula
        let driver = self.resolver.driver_for_zone_name(&student.zone).await?;
        if driver.is_none() {
            warn!("⚠️ Zona '{}' sin conductor asignado; bitácora con driver nulo", student.zone);
        }

        self.trip_logs
            .append_event(
                student_id,
                trip_date,
                driver.as_ref().map(|d| d.id),
                new_status.as_str(),
                timestamp,
            )
            .await?;

        let event = TripEvent {
            status: new_status.to_string(),
            timestamp,
        };

        let notified = self.notify_parent(&student, new_status, &event).await;

        info!(
            "✅ {} → {} (alumno {}, notificado: {})",
            current, new_status, student.name, notified
        );

        Ok(TripTransitionResponse {
            student_id,
            status: new_status,
            event,
            notified,
        })
    }

    /// Efectos de notificación, siempre contenidos: un fallo aquí nunca
    /// revierte ni falla la transición ya aplicada.
    async fn notify_parent(&self, student: &Student, status: TripStatus, event: &TripEvent) -> bool {
        let outcome = self
            .fanout
            .notify_parent_status(student.parent_id, &student.name, status.status_message())
            .await;

        let (parent_user, delivered) = match outcome {
            Ok((user, report)) => (user, report.delivered > 0),
            Err(e) => {
                warn!("⚠️ Notificación de estado fallida para {}: {}", student.name, e);
                return false;
            }
        };

        if let Some(user_id) = parent_user {
            let data = serde_json::json!({
                "student_id": student.id,
                "student_name": student.name,
                "status": status.as_str(),
                "timestamp": event.timestamp,
            });
            if let Err(e) = self
                .publisher
                .publish(&parent_channel(user_id), "status-update", data)
                .await
            {
                warn!("⚠️ Evento de estado no publicado en canal privado: {}", e);
            }
        }

        delivered
    }

    /// Historial de bitácoras de un conductor (más recientes primero)
    pub async fn history_for_driver(&self, driver_id: Uuid) -> Result<Vec<TripHistoryEntry>, AppError> {
        let logs = self.trip_logs.find_by_driver(driver_id, 50).await?;
        Ok(logs
            .into_iter()
            .map(|log| TripHistoryEntry {
                student_id: log.student_id,
                driver_id: log.driver_id,
                trip_date: log.trip_date,
                events: log.events.0,
            })
            .collect())
    }

    /// Historial de los hijos de un tutor (más recientes primero). Un tutor
    /// sin alumnos produce una lista vacía, no un error.
    pub async fn history_for_parent(&self, parent_id: Uuid) -> Result<Vec<TripHistoryEntry>, AppError> {
        let students = self.students.find_by_parent(parent_id).await?;
        if students.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = students.iter().map(|s| s.id).collect();
        let logs = self.trip_logs.find_by_students(&ids, 50).await?;
        Ok(logs
            .into_iter()
            .map(|log| TripHistoryEntry {
                student_id: log.student_id,
                driver_id: log.driver_id,
                trip_date: log.trip_date,
                events: log.events.0,
            })
            .collect())
    }
}
