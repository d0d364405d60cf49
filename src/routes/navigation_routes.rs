use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::navigation_controller::NavigationController;
use crate::dto::route_dto::RouteResponse;
use crate::dto::trip_dto::TripType;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_navigation_router() -> Router<AppState> {
    Router::new().route("/route/:driver_id", get(current_route))
}

#[derive(Debug, Deserialize)]
struct RouteQuery {
    trip_type: TripType,
}

async fn current_route(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let controller = NavigationController::new(state.routes.clone());
    let route = controller.current_route(driver_id, query.trip_type).await?;
    Ok(Json(route))
}
