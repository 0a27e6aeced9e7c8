use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::safe_zone_controller::SafeZoneController;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::models::safe_zone::{
    CreateSafeZoneRequest, NearbyQuery, SafeZoneResponse, UpdateSafeZoneRequest,
};
use crate::routes::meeting_routes;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_safe_zone_router(jwt: JwtConfig) -> Router<AppState> {
    // Alta/edición/baja de zonas: solo administradores
    let admin = Router::new()
        .route("/", post(create_zone))
        .route("/:id", put(update_zone))
        .route("/:id", delete(deactivate_zone))
        .route_layer(axum::middleware::from_fn(require_admin))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/meetings", meeting_routes::create_meeting_router(jwt))
        .route("/", get(list_zones))
        .route("/nearby", get(nearby_zones))
        .route("/:id", get(get_zone))
        .merge(admin)
}

async fn create_zone(
    State(state): State<AppState>,
    Json(request): Json<CreateSafeZoneRequest>,
) -> Result<Json<ApiResponse<SafeZoneResponse>>, AppError> {
    let controller = SafeZoneController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_zones(
    State(state): State<AppState>,
) -> Result<Json<Vec<SafeZoneResponse>>, AppError> {
    let controller = SafeZoneController::new(state.pool.clone());
    let response = controller.list_active().await?;
    Ok(Json(response))
}

async fn nearby_zones(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<SafeZoneResponse>>, AppError> {
    let controller = SafeZoneController::new(state.pool.clone());
    let response = controller.nearby(query).await?;
    Ok(Json(response))
}

async fn get_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SafeZoneResponse>, AppError> {
    let controller = SafeZoneController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSafeZoneRequest>,
) -> Result<Json<ApiResponse<SafeZoneResponse>>, AppError> {
    let controller = SafeZoneController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn deactivate_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = SafeZoneController::new(state.pool.clone());
    controller.deactivate(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Zona desactivada exitosamente"
    })))
}
