use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::message_controller::MessageController;
use crate::dto::common::ApiResponse;
use crate::middleware::auth::auth_middleware;
use crate::models::conversation::{
    ConversationResponse, MessagePagination, MessageResponse, SendMessageRequest,
    StartConversationRequest,
};
use crate::models::user::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_conversation_router(jwt: JwtConfig) -> Router<AppState> {
    Router::new()
        .route("/", post(start_conversation))
        .route("/", get(list_conversations))
        .route("/:id/messages", get(list_messages))
        .route("/:id/messages", post(send_message))
        .route_layer(axum::middleware::from_fn_with_state(jwt, auth_middleware))
}

async fn start_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<StartConversationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let controller = MessageController::new(state.pool.clone());
    let response = controller.start_conversation(user.id, request).await?;
    Ok(Json(response))
}

async fn list_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ConversationResponse>>, AppError> {
    let controller = MessageController::new(state.pool.clone());
    let response = controller.list_conversations(user.id).await?;
    Ok(Json(response))
}

async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<MessagePagination>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let controller = MessageController::new(state.pool.clone());
    let response = controller.list_messages(user.id, id, pagination).await?;
    Ok(Json(response))
}

async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let controller = MessageController::new(state.pool.clone());
    let response = controller.send_message(user.id, id, request).await?;
    Ok(Json(response))
}
