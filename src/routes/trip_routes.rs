use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::trip_controller::TripController;
use crate::dto::trip_dto::{TripHistoryEntry, TripTransitionRequest, TripTransitionResponse};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/:student_id/status", put(apply_transition))
        .route("/history/driver/:driver_id", get(history_for_driver))
        .route("/history/parent/:parent_id", get(history_for_parent))
}

async fn apply_transition(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<TripTransitionRequest>,
) -> Result<Json<ApiResponse<TripTransitionResponse>>, AppError> {
    let controller = TripController::new(state.trips.clone());
    let response = controller.apply_transition(student_id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn history_for_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<Vec<TripHistoryEntry>>, AppError> {
    let controller = TripController::new(state.trips.clone());
    let history = controller.history_for_driver(driver_id).await?;
    Ok(Json(history))
}

async fn history_for_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
) -> Result<Json<Vec<TripHistoryEntry>>, AppError> {
    let controller = TripController::new(state.trips.clone());
    let history = controller.history_for_parent(parent_id).await?;
    Ok(Json(history))
}
