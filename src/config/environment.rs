//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Si el checksum del VIN inválido se trata como error duro.
    /// Por defecto relajado: el mismatch se reporta sólo como warning.
    pub vin_strict_checksum: bool,
    // Servicios externos de verificación vehicular
    pub vehicle_decode_url: String,
    pub nicb_api_url: String,
    pub nicb_api_key: Option<String>,
    // Proveedor SMS para códigos OTP
    pub sms_api_url: Option<String>,
    pub sms_account_sid: Option<String>,
    pub sms_auth_token: Option<String>,
    pub sms_from_number: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiration: env::var("JWT_EXPIRATION")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .expect("JWT_EXPIRATION must be a valid number"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("RATE_LIMIT_REQUESTS must be a valid number"),
            rate_limit_window: env::var("RATE_LIMIT_WINDOW")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("RATE_LIMIT_WINDOW must be a valid number"),
            vin_strict_checksum: env::var("VIN_STRICT_CHECKSUM")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            vehicle_decode_url: env::var("VEHICLE_DECODE_URL")
                .unwrap_or_else(|_| "https://vpic.nhtsa.dot.gov/api/vehicles".to_string()),
            nicb_api_url: env::var("NICB_API_URL")
                .unwrap_or_else(|_| "https://api.nicb.org/v1/vincheck".to_string()),
            nicb_api_key: env::var("NICB_API_KEY").ok().filter(|k| !k.is_empty()),
            sms_api_url: env::var("SMS_API_URL").ok().filter(|v| !v.is_empty()),
            sms_account_sid: env::var("SMS_ACCOUNT_SID").ok().filter(|v| !v.is_empty()),
            sms_auth_token: env::var("SMS_AUTH_TOKEN").ok().filter(|v| !v.is_empty()),
            sms_from_number: env::var("SMS_FROM_NUMBER").ok().filter(|v| !v.is_empty()),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Verificar si el proveedor SMS está configurado
    pub fn sms_configured(&self) -> bool {
        self.sms_api_url.is_some()
            && self.sms_account_sid.is_some()
            && self.sms_auth_token.is_some()
            && self.sms_from_number.is_some()
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
