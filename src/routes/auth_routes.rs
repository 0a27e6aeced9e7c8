use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::auth_middleware;
use crate::models::user::{AuthUser, LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_auth_router(jwt: JwtConfig) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(jwt, auth_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.register(request).await?;
    Ok(Json(response))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.me(user.id).await?;
    Ok(Json(response))
}
