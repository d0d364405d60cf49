use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::zone_controller::ZoneController;
use crate::dto::zone_dto::{CreateZoneRequest, ResolveZoneQuery, ResolvedZoneResponse, UpdateZoneRequest};
use crate::dto::ApiResponse;
use crate::models::zone::Zone;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_zone_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_zones))
        .route("/", post(create_zone))
        .route("/resolve", get(resolve_zone))
        .route("/:id", put(update_zone))
        .route("/:id", delete(delete_zone))
}

async fn list_zones(State(state): State<AppState>) -> Result<Json<Vec<Zone>>, AppError> {
    let controller = ZoneController::new(state.pool.clone());
    let zones = controller.list().await?;
    Ok(Json(zones))
}

async fn create_zone(
    State(state): State<AppState>,
    Json(request): Json<CreateZoneRequest>,
) -> Result<Json<ApiResponse<Zone>>, AppError> {
    let controller = ZoneController::new(state.pool.clone());
    let zone = controller.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        zone,
        "Zone created successfully".to_string(),
    )))
}

async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateZoneRequest>,
) -> Result<Json<ApiResponse<Zone>>, AppError> {
    let controller = ZoneController::new(state.pool.clone());
    let zone = controller.update_geometry(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        zone,
        "Zone geometry updated".to_string(),
    )))
}

async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = ZoneController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Zone deleted successfully"
    })))
}

/// Un punto fuera de toda zona de servicio responde body `null`
async fn resolve_zone(
    State(state): State<AppState>,
    Query(query): Query<ResolveZoneQuery>,
) -> Result<Json<Option<ResolvedZoneResponse>>, AppError> {
    let controller = ZoneController::new(state.pool.clone());
    let resolved = controller.resolve(query.lat, query.lng).await?;
    Ok(Json(resolved))
}
