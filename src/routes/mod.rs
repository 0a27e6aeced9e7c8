//! Routers de la API

pub mod auth_routes;
pub mod conversation_routes;
pub mod listing_routes;
pub mod meeting_routes;
pub mod safe_zone_routes;
pub mod verification_routes;

use axum::Router;

use crate::state::AppState;

/// Crear el router principal de la API
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes::create_auth_router(state.jwt.clone()))
        .nest(
            "/api/listings",
            listing_routes::create_listing_router(state.jwt.clone()),
        )
        .nest(
            "/api/safe-zones",
            safe_zone_routes::create_safe_zone_router(state.jwt.clone()),
        )
        .nest(
            "/api/conversations",
            conversation_routes::create_conversation_router(state.jwt.clone()),
        )
        .nest(
            "/api",
            verification_routes::create_verification_router(state.jwt.clone()),
        )
}
