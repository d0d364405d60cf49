use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::subscription_controller::SubscriptionController;
use crate::dto::subscription_dto::SubscribeRequest;
use crate::dto::ApiResponse;
use crate::models::subscription::Subscription;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_subscription_router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<ApiResponse<Subscription>>, AppError> {
    let controller = SubscriptionController::new(state.pool.clone());
    let subscription = controller.subscribe(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        subscription,
        "Subscription saved".to_string(),
    )))
}
