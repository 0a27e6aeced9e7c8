//! Middleware de Rate Limiting
//!
//! Limitación de velocidad de requests por proceso, con ventana fija de
//! reloj de pared. La clave es el token bearer si está presente, si no la
//! IP del cliente. El estado es local al proceso: con varias instancias
//! cada una cuenta por separado (supuesto documentado de instancia única).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::EnvironmentConfig;
use crate::utils::errors::AppError;

/// Probabilidad de barrer entradas expiradas en un chequeo dado
const SWEEP_PROBABILITY: f64 = 0.01;

/// Información de rate limiting por clave
#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Estado global del rate limiting
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
}

impl RateLimitState {
    /// Crear nuevo estado de rate limiting desde la configuración
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self::with_limits(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window),
        )
    }

    pub fn with_limits(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
        }
    }

    /// Verificar si una clave ha excedido el límite.
    ///
    /// La ventana se resetea perezosamente al tocar la clave; las entradas
    /// de otras claves expiradas se barren de forma probabilística para no
    /// pagar el retain completo en cada request.
    pub async fn check_rate_limit(&self, key: &str) -> Result<(), RateLimitError> {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        // Sweep probabilístico de entradas expiradas
        if rand::thread_rng().gen::<f64>() < SWEEP_PROBABILITY {
            let window = self.window_duration;
            requests.retain(|_, info| now.duration_since(info.window_start) < window);
        }

        let info = requests.entry(key.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        // Reset perezoso si la ventana de esta clave ya expiró
        if now.duration_since(info.window_start) >= self.window_duration {
            info.requests = 1;
            info.window_start = now;
            return Ok(());
        }

        if info.requests >= self.max_requests {
            return Err(RateLimitError::LimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

/// Errores de rate limiting
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded")]
    LimitExceeded,
}

/// Clave del limitador: token bearer si existe, si no la IP del cliente
fn rate_limit_key(request: &Request) -> String {
    if let Some(auth) = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return format!("token:{}", token);
            }
        }
    }

    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .split(',')
        .next()
        .unwrap_or("unknown")
        .trim();

    format!("ip:{}", ip)
}

/// Middleware de rate limiting
pub async fn rate_limit_middleware(
    State(rate_limit_state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = rate_limit_key(&request);

    if let Err(RateLimitError::LimitExceeded) = rate_limit_state.check_rate_limit(&key).await {
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_is_enforced() {
        let state = RateLimitState::with_limits(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(state.check_rate_limit("ip:1.2.3.4").await.is_ok());
        }
        // La request N+1 dentro de la ventana se rechaza
        assert!(state.check_rate_limit("ip:1.2.3.4").await.is_err());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let state = RateLimitState::with_limits(1, Duration::from_secs(60));

        assert!(state.check_rate_limit("ip:1.2.3.4").await.is_ok());
        assert!(state.check_rate_limit("ip:1.2.3.4").await.is_err());
        assert!(state.check_rate_limit("ip:5.6.7.8").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets_lazily() {
        let state = RateLimitState::with_limits(1, Duration::from_millis(50));

        assert!(state.check_rate_limit("token:abc").await.is_ok());
        assert!(state.check_rate_limit("token:abc").await.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(state.check_rate_limit("token:abc").await.is_ok());
    }
}
