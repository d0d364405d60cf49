use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::notification_controller::NotificationController;
use crate::dto::notification_dto::{BroadcastRequest, DeliveryReport, EmergencyRequest, RequestChangeRequest};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/broadcast", post(broadcast))
        .route("/emergency", post(emergency))
        .route("/request-change", post(request_change))
}

async fn broadcast(
    State(state): State<AppState>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<DeliveryReport>>, AppError> {
    let controller = NotificationController::new(state.fanout.clone());
    let report = controller.broadcast(request).await?;
    let message = format!("Notification sent to {} endpoints", report.attempted);
    Ok(Json(ApiResponse::success_with_message(report, message)))
}

async fn emergency(
    State(state): State<AppState>,
    Json(request): Json<EmergencyRequest>,
) -> Result<Json<ApiResponse<DeliveryReport>>, AppError> {
    let controller = NotificationController::new(state.fanout.clone());
    let (report, students) = controller.emergency(request).await?;
    let message = format!("Emergency notice sent for {} students in transit", students);
    Ok(Json(ApiResponse::success_with_message(report, message)))
}

async fn request_change(
    State(state): State<AppState>,
    Json(request): Json<RequestChangeRequest>,
) -> Result<Json<ApiResponse<DeliveryReport>>, AppError> {
    let controller = NotificationController::new(state.fanout.clone());
    let report = controller.request_change(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        report,
        "Substitute request forwarded to admins".to_string(),
    )))
}
