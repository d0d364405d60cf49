use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::driver_controller::DriverController;
use crate::dto::location_dto::{
    HandoverRequest, HandoverResponse, LocationUpdateRequest, ParentTrackingResponse,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/location", post(record_location))
        .route("/handover", post(handover))
        .route("/for-parent/:parent_id", get(drivers_for_parent))
}

fn controller(state: &AppState) -> DriverController {
    DriverController::new(
        state.pool.clone(),
        state.fanout.clone(),
        state.locations.clone(),
    )
}

async fn record_location(
    State(state): State<AppState>,
    Json(request): Json<LocationUpdateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    controller(&state).record_location(request).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Location updated"
    })))
}

async fn handover(
    State(state): State<AppState>,
    Json(request): Json<HandoverRequest>,
) -> Result<Json<ApiResponse<HandoverResponse>>, AppError> {
    let response = controller(&state).handover(request).await?;
    let message = format!("{} students moved to zone {}", response.moved, response.zone);
    Ok(Json(ApiResponse::success_with_message(response, message)))
}

/// Listas vacías (estado claramente etiquetado) cuando el tutor no tiene
/// alumnos registrados
async fn drivers_for_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
) -> Result<Json<ParentTrackingResponse>, AppError> {
    let tracking = controller(&state).parent_tracking(parent_id).await?;
    Ok(Json(tracking))
}
