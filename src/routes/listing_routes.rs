use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::listing_controller::ListingController;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::auth_middleware;
use crate::models::listing::{
    CreateListingRequest, ListingFilters, ListingResponse, UpdateListingRequest,
};
use crate::models::user::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_listing_router(jwt: JwtConfig) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_listing))
        .route("/mine", get(my_listings))
        .route("/:id", put(update_listing))
        .route("/:id", delete(delete_listing))
        .route_layer(axum::middleware::from_fn_with_state(jwt, auth_middleware));

    Router::new()
        .route("/", get(search_listings))
        .route("/:id", get(get_listing))
        .merge(protected)
}

async fn create_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateListingRequest>,
) -> Result<Json<ApiResponse<ListingResponse>>, AppError> {
    let controller = ListingController::new(state.pool.clone(), state.config.vin_strict_checksum);
    let response = controller.create(user.id, request).await?;
    Ok(Json(response))
}

async fn search_listings(
    State(state): State<AppState>,
    Query(filters): Query<ListingFilters>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let controller = ListingController::new(state.pool.clone(), state.config.vin_strict_checksum);
    let response = controller.search(filters).await?;
    Ok(Json(response))
}

async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingResponse>, AppError> {
    let controller = ListingController::new(state.pool.clone(), state.config.vin_strict_checksum);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn my_listings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let controller = ListingController::new(state.pool.clone(), state.config.vin_strict_checksum);
    let response = controller.list_by_seller(user.id).await?;
    Ok(Json(response))
}

async fn update_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ApiResponse<ListingResponse>>, AppError> {
    let controller = ListingController::new(state.pool.clone(), state.config.vin_strict_checksum);
    let response = controller.update(id, user.id, request).await?;
    Ok(Json(response))
}

async fn delete_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = ListingController::new(state.pool.clone(), state.config.vin_strict_checksum);
    controller.delete(id, user.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Anuncio eliminado exitosamente"
    })))
}
