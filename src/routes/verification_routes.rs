use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::verification_controller::VerificationController;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::auth_middleware;
use crate::models::user::AuthUser;
use crate::models::verification::{
    IdentitySubmissionRequest, SendOtpRequest, VerificationStatusResponse, VerifyOtpRequest,
    VerifyVinData, VerifyVinRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_verification_router(jwt: JwtConfig) -> Router<AppState> {
    Router::new()
        .route("/verify-vin", post(verify_vin))
        .route("/verification/phone/send", post(send_otp))
        .route("/verification/phone/verify", post(verify_otp))
        .route("/verification/identity", post(submit_identity))
        .route("/verification/status", get(verification_status))
        .route_layer(axum::middleware::from_fn_with_state(jwt, auth_middleware))
}

fn controller(state: &AppState) -> VerificationController {
    VerificationController::new(
        state.pool.clone(),
        state.config.clone(),
        state.http_client.clone(),
    )
}

async fn verify_vin(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<VerifyVinRequest>,
) -> Result<Json<ApiResponse<VerifyVinData>>, AppError> {
    let response = controller(&state).verify_vin(request).await?;
    Ok(Json(response))
}

async fn send_otp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let response = controller(&state).send_otp(user.id, request).await?;
    Ok(Json(response))
}

async fn verify_otp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let response = controller(&state).verify_otp(user.id, request).await?;
    Ok(Json(response))
}

async fn submit_identity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<IdentitySubmissionRequest>,
) -> Result<Json<ApiResponse<VerificationStatusResponse>>, AppError> {
    let response = controller(&state).submit_identity(user.id, request).await?;
    Ok(Json(response))
}

async fn verification_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<VerificationStatusResponse>, AppError> {
    let response = controller(&state).status(user.id).await?;
    Ok(Json(response))
}
