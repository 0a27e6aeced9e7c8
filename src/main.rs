mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use middleware::rate_limit::{rate_limit_middleware, RateLimitState};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🏍️ SafeTrade - Marketplace de motos entre particulares");
    info!("======================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let app_state = AppState::new(pool, config.clone());
    let rate_limit_state = RateLimitState::new(&config);

    // CORS permisivo solo en desarrollo
    let cors = if config.is_development() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(&config.cors_origins)
    };

    // Crear router de la API
    let app = Router::new()
        .route("/health", get(health_endpoint))
        .merge(routes::create_api_router(&app_state))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ))
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("👤 Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/auth/me - Usuario actual");
    info!("🏍️ Listings:");
    info!("   GET  /api/listings - Buscar anuncios");
    info!("   POST /api/listings - Crear anuncio");
    info!("   GET  /api/listings/:id - Obtener anuncio");
    info!("   PUT  /api/listings/:id - Actualizar anuncio");
    info!("   DELETE /api/listings/:id - Eliminar anuncio");
    info!("📍 Safe Zones:");
    info!("   GET  /api/safe-zones - Listar zonas activas");
    info!("   GET  /api/safe-zones/nearby - Zonas cercanas");
    info!("   POST /api/safe-zones - Crear zona (admin)");
    info!("🤝 Meetings:");
    info!("   POST /api/safe-zones/meetings/availability - Chequear disponibilidad");
    info!("   POST /api/safe-zones/meetings - Agendar encuentro");
    info!("   POST /api/safe-zones/meetings/:id/check-in - Check-in");
    info!("💬 Mensajería:");
    info!("   POST /api/conversations - Iniciar conversación");
    info!("   GET  /api/conversations - Listar conversaciones");
    info!("   POST /api/conversations/:id/messages - Enviar mensaje");
    info!("🛡️ Verificación:");
    info!("   POST /api/verify-vin - Validar VIN y chequear robo");
    info!("   POST /api/verification/phone/send - Enviar código OTP");
    info!("   POST /api/verification/phone/verify - Verificar código OTP");
    info!("   POST /api/verification/identity - Verificar identidad");
    info!("   GET  /api/verification/status - Estado de verificación");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "safetrade",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
