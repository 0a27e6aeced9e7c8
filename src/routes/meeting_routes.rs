use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::meeting_controller::MeetingController;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::auth_middleware;
use crate::models::meeting::{
    AvailabilityRequest, AvailabilityResponse, CreateMeetingRequest, MeetingResponse,
};
use crate::models::user::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_meeting_router(jwt: JwtConfig) -> Router<AppState> {
    Router::new()
        .route("/availability", post(check_availability))
        .route("/", post(create_meeting))
        .route("/", get(my_meetings))
        .route("/:id/check-in", post(check_in))
        .route("/:id/complete", post(complete))
        .route("/:id/cancel", post(cancel))
        .route("/:id/no-show", post(no_show))
        .route_layer(axum::middleware::from_fn_with_state(jwt, auth_middleware))
}

async fn check_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.availability(user.id, request).await?;
    Ok(Json(response))
}

async fn create_meeting(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateMeetingRequest>,
) -> Result<Json<ApiResponse<MeetingResponse>>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.create(user.id, request).await?;
    Ok(Json(response))
}

async fn my_meetings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MeetingResponse>>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.list_for_user(user.id).await?;
    Ok(Json(response))
}

async fn check_in(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.check_in(id, user.id).await?;
    Ok(Json(response))
}

async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.complete(id, user.id).await?;
    Ok(Json(response))
}

async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.cancel(id, user.id).await?;
    Ok(Json(response))
}

async fn no_show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, AppError> {
    let controller = MeetingController::new(state.pool.clone());
    let response = controller.no_show(id, user.id).await?;
    Ok(Json(response))
}
