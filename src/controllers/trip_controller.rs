use std::sync::Arc;
use uuid::Uuid;

use crate::dto::trip_dto::{TripHistoryEntry, TripTransitionRequest, TripTransitionResponse};
use crate::services::TripStateMachine;
use crate::utils::errors::AppError;

pub struct TripController {
    trips: Arc<TripStateMachine>,
}

impl TripController {
    pub fn new(trips: Arc<TripStateMachine>) -> Self {
        Self { trips }
    }

    pub async fn apply_transition(
        &self,
        student_id: Uuid,
        request: TripTransitionRequest,
    ) -> Result<TripTransitionResponse, AppError> {
        self.trips.apply_transition(student_id, &request.status).await
    }

    pub async fn history_for_driver(&self, driver_id: Uuid) -> Result<Vec<TripHistoryEntry>, AppError> {
        self.trips.history_for_driver(driver_id).await
    }

    pub async fn history_for_parent(&self, parent_id: Uuid) -> Result<Vec<TripHistoryEntry>, AppError> {
        self.trips.history_for_parent(parent_id).await
    }
}
