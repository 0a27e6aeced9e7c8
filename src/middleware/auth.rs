//! Middleware de autenticación
//!
//! Valida el token bearer del header Authorization y deja el usuario
//! autenticado disponible como extension del request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::user::AuthUser;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

/// Middleware de autenticación por token bearer
pub async fn auth_middleware(
    State(jwt): State<JwtConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Unauthorized("Falta el header Authorization".to_string()))?;

    let token = extract_token_from_header(&auth_header)?;
    let claims = verify_token(token, &jwt)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Token con subject inválido".to_string()))?;

    let auth_user = AuthUser {
        id: user_id,
        email: claims.email,
        role: claims.role,
    };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware de autorización para endpoints de administración.
/// Debe aplicarse después de `auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Usuario no autenticado".to_string()))?;

    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Se requiere rol de administrador".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::generate_token;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "secret-para-tests".to_string(),
            expiration: 3600,
        }
    }

    fn protected_app(jwt: JwtConfig) -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route_layer(axum::middleware::from_fn_with_state(jwt, auth_middleware))
    }

    #[tokio::test]
    async fn test_request_without_token_is_rejected() {
        let app = protected_app(jwt_config());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_with_valid_token_passes() {
        let jwt = jwt_config();
        let token = generate_token(Uuid::new_v4(), "rider@example.com", "user", &jwt).unwrap();
        let app = protected_app(jwt);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_with_garbage_token_is_rejected() {
        let app = protected_app(jwt_config());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", "Bearer no.es.un-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
