//! Fan-out de notificaciones
//!
//! Resuelve destinatarios a sus endpoints, entrega en paralelo a todos y
//! agrega el resultado sin que el fallo de un endpoint aborte el resto
//! (settle-all, no fail-fast). Los endpoints muertos se eliminan solos.

use futures::future::join_all;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::dto::notification_dto::{DeliveryReport, PushPayload};
use crate::dto::trip_dto::TripType;
use crate::models::subscription::Subscription;
use crate::models::user::Role;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::student_repository::StudentRepository;
use crate::repositories::subscription_repository::SubscriptionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::push_client::{PushClient, PushError};
use crate::utils::errors::AppError;

/// Resultado crudo de un lote de entregas antes del auto-saneado
pub struct DispatchOutcome {
    pub report: DeliveryReport,
    /// Suscripciones que reportaron "gone" y deben eliminarse
    pub gone: Vec<Uuid>,
}

/// Entregar un payload a todos los endpoints en paralelo y esperar a que
/// todos terminen. Ningún fallo individual se propaga.
pub async fn dispatch_to_endpoints(
    push: &dyn PushClient,
    subscriptions: &[Subscription],
    payload: &PushPayload,
) -> DispatchOutcome {
    let deliveries = subscriptions
        .iter()
        .map(|sub| async move { (sub.id, push.deliver(sub, payload).await) });

    let settled = join_all(deliveries).await;

    let mut report = DeliveryReport {
        attempted: subscriptions.len(),
        ..Default::default()
    };
    let mut gone = Vec::new();

    for (id, result) in settled {
        match result {
            Ok(()) => report.delivered += 1,
            Err(PushError::Gone) => {
                report.expired_removed += 1;
                gone.push(id);
            }
            Err(PushError::Failed(reason)) => {
                warn!("⚠️ Entrega push fallida para suscripción {}: {}", id, reason);
                report.failed += 1;
            }
        }
    }

    DispatchOutcome { report, gone }
}

pub struct NotificationFanout {
    subscriptions: SubscriptionRepository,
    users: UserRepository,
    drivers: DriverRepository,
    students: StudentRepository,
    push: Arc<dyn PushClient>,
}

impl NotificationFanout {
    pub fn new(pool: PgPool, push: Arc<dyn PushClient>) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool.clone()),
            students: StudentRepository::new(pool),
            push,
        }
    }

    /// Enviar a todos los endpoints de un conjunto de cuentas, con
    /// auto-saneado de los endpoints muertos
    pub async fn send_to_users(
        &self,
        user_ids: &[Uuid],
        payload: &PushPayload,
    ) -> Result<DeliveryReport, AppError> {
        if user_ids.is_empty() {
            return Ok(DeliveryReport::default());
        }

        let subscriptions = self.subscriptions.find_by_user_ids(user_ids).await?;
        let outcome = dispatch_to_endpoints(self.push.as_ref(), &subscriptions, payload).await;

        for id in &outcome.gone {
            if let Err(e) = self.subscriptions.delete_by_id(*id).await {
                warn!("⚠️ No se pudo eliminar la suscripción expirada {}: {}", id, e);
            }
        }

        Ok(outcome.report)
    }

    /// Broadcast del admin a conductores, opcionalmente limitado a una zona.
    /// Cero conductores en la zona es un resultado vacío, no un error.
    pub async fn broadcast_to_drivers(
        &self,
        target_zone: Option<&str>,
        message: &str,
    ) -> Result<DeliveryReport, AppError> {
        let drivers = match target_zone {
            Some(zone) if zone != "all" => self.drivers.find_by_zones(&[zone.to_string()]).await?,
            _ => self.drivers.find_all().await?,
        };
        let profile_ids: Vec<Uuid> = drivers.iter().map(|d| d.id).collect();
        if profile_ids.is_empty() {
            return Ok(DeliveryReport::default());
        }

        let users = self.users.find_by_profiles(&profile_ids, Role::Driver).await?;
        let user_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let payload = PushPayload::new("Announcement from dispatch", message);
        self.send_to_users(&user_ids, &payload).await
    }

    /// Aviso de emergencia de un conductor: llega a los tutores de los
    /// alumnos que están en tránsito con él en este momento (snapshot del
    /// estado actual, no una suscripción).
    pub async fn emergency_to_parents(
        &self,
        driver_id: Uuid,
        trip_type: TripType,
        message: &str,
    ) -> Result<(DeliveryReport, usize), AppError> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("driver '{}' not found", driver_id)))?;

        let students = self
            .students
            .find_in_transit(&driver.zone, trip_type.in_transit_status())
            .await?;

        let mut report = DeliveryReport::default();
        for student in &students {
            let parent = match self.users.find_by_profile(student.parent_id, Role::Parent).await? {
                Some(user) => user,
                None => continue,
            };
            let payload = PushPayload::new(
                "Emergency notice from the driver",
                format!("For {}: {}", student.name, message),
            );
            let partial = self.send_to_users(&[parent.id], &payload).await?;
            report.merge(&partial);
        }

        Ok((report, students.len()))
    }

    /// Petición de conductor sustituto: notifica a todos los admins
    pub async fn request_substitute(
        &self,
        driver_id: Uuid,
        reason: &str,
    ) -> Result<DeliveryReport, AppError> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("driver '{}' not found", driver_id)))?;

        let admins = self.users.find_by_role(Role::Admin).await?;
        let user_ids: Vec<Uuid> = admins.iter().map(|u| u.id).collect();

        let payload = PushPayload::new(
            format!("Substitute driver request (zone {})", driver.zone),
            format!("Driver {} is requesting a substitute. Reason: \"{}\"", driver.name, reason),
        );
        self.send_to_users(&user_ids, &payload).await
    }

    /// Notificación de cambio de estado al tutor de un alumno. Devuelve el
    /// user del tutor (si existe) para que el caller publique también en su
    /// canal privado.
    pub async fn notify_parent_status(
        &self,
        parent_id: Uuid,
        student_name: &str,
        status_text: &str,
    ) -> Result<(Option<Uuid>, DeliveryReport), AppError> {
        let parent = match self.users.find_by_profile(parent_id, Role::Parent).await? {
            Some(user) => user,
            None => {
                warn!("⚠️ Tutor {} sin cuenta; notificación omitida", parent_id);
                return Ok((None, DeliveryReport::default()));
            }
        };

        let payload = PushPayload::new(
            "Trip status update",
            format!("{} {}", student_name, status_text),
        );
        let report = self.send_to_users(&[parent.id], &payload).await?;
        Ok((Some(parent.id), report))
    }

    /// Aviso de traspaso al conductor sustituto
    pub async fn notify_handover(
        &self,
        to_driver_id: Uuid,
        moved: u64,
    ) -> Result<DeliveryReport, AppError> {
        let user = match self.users.find_by_profile(to_driver_id, Role::Driver).await? {
            Some(user) => user,
            None => return Ok(DeliveryReport::default()),
        };
        let payload = PushPayload::new(
            "Student handover",
            format!("You received a handover of {} students. Please check your pickup list.", moved),
        );
        self.send_to_users(&[user.id], &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscription::SubscriptionKeys;
    use chrono::Utc;
    use sqlx::types::Json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    /// Fake de proveedor push controlado por endpoint
    struct FakePush {
        calls: AtomicUsize,
    }

    impl FakePush {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl PushClient for FakePush {
        async fn deliver(
            &self,
            subscription: &Subscription,
            _payload: &PushPayload,
        ) -> Result<(), PushError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if subscription.endpoint.contains("gone") {
                return Err(PushError::Gone);
            }
            if subscription.endpoint.contains("slow-fail") {
                sleep(Duration::from_millis(50)).await;
                return Err(PushError::Failed("timeout".to_string()));
            }
            Ok(())
        }
    }

    fn subscription(endpoint: &str) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            endpoint: endpoint.to_string(),
            keys: Json(SubscriptionKeys {
                p256dh: "p256dh-key".to_string(),
                auth: "auth-key".to_string(),
            }),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn settles_all_endpoints_despite_failures() {
        let push = FakePush::new();
        let subs = vec![
            subscription("https://push.example/ok-1"),
            subscription("https://push.example/slow-fail"),
            subscription("https://push.example/ok-2"),
        ];
        let payload = PushPayload::new("t", "b");

        let outcome = dispatch_to_endpoints(&push, &subs, &payload).await;

        assert_eq!(outcome.report.attempted, 3);
        assert_eq!(outcome.report.delivered, 2);
        assert_eq!(outcome.report.failed, 1);
        assert_eq!(push.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gone_endpoint_is_flagged_for_removal_not_raised() {
        let push = FakePush::new();
        let gone_sub = subscription("https://push.example/gone");
        let gone_id = gone_sub.id;
        let subs = vec![
            subscription("https://push.example/ok-1"),
            gone_sub,
            subscription("https://push.example/ok-2"),
        ];
        let payload = PushPayload::new("t", "b");

        let outcome = dispatch_to_endpoints(&push, &subs, &payload).await;

        assert_eq!(outcome.report.delivered, 2);
        assert_eq!(outcome.report.expired_removed, 1);
        assert_eq!(outcome.gone, vec![gone_id]);
    }

    #[tokio::test]
    async fn empty_audience_yields_empty_report() {
        let push = FakePush::new();
        let payload = PushPayload::new("t", "b");
        let outcome = dispatch_to_endpoints(&push, &[], &payload).await;
        assert_eq!(outcome.report, DeliveryReport::default());
        assert_eq!(push.calls.load(Ordering::SeqCst), 0);
    }
}
