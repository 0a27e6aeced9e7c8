//! Modelos de verificación de identidad y de vehículo
//!
//! Cubre el registro local de vehículos robados, el historial de
//! verificaciones por VIN, las verificaciones de identidad (documento +
//! liveness) y los códigos OTP por SMS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Fila del registro local de vehículos robados
#[derive(Debug, Clone, FromRow)]
pub struct StolenVehicleRecord {
    pub id: Uuid,
    pub vin: String,
    pub report_id: String,
    pub reported_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Historial de verificaciones por VIN (upsert, last-write-wins)
#[derive(Debug, Clone, FromRow)]
pub struct VinVerification {
    pub vin: String,
    pub is_stolen: bool,
    pub source: String,
    pub report_id: Option<String>,
    pub reported_date: Option<DateTime<Utc>>,
    pub vehicle_info: Json<serde_json::Value>,
    pub last_checked: DateTime<Utc>,
}

/// Verificación de identidad (documento o liveness)
#[derive(Debug, Clone, FromRow)]
pub struct IdentityVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub status: String,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Código OTP enviado por SMS
#[derive(Debug, Clone, FromRow)]
pub struct PhoneOtp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request del endpoint de verificación de VIN
#[derive(Debug, Deserialize)]
pub struct VerifyVinRequest {
    pub vin: String,
}

/// Datos de la verificación de VIN devueltos al cliente
#[derive(Debug, Serialize)]
pub struct VerifyVinData {
    pub vin: String,
    pub is_valid: bool,
    pub is_stolen: bool,
    pub vehicle_info: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stolen_check: Option<StolenCheckSummary>,
    pub alerts: Vec<String>,
}

/// Resumen del chequeo de robo incluido en la response
#[derive(Debug, Serialize)]
pub struct StolenCheckSummary {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_date: Option<String>,
    pub last_checked: String,
}

/// Request para enviar un código OTP
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
}

/// Request para verificar un código OTP
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

/// Request para enviar documento + selfie
#[derive(Debug, Deserialize, Validate)]
pub struct IdentitySubmissionRequest {
    #[validate(length(min = 2, max = 40))]
    pub document_type: String,

    #[validate(length(min = 5, max = 500))]
    pub document_photo_url: String,

    #[validate(length(min = 5, max = 500))]
    pub selfie_url: String,
}

/// Estado agregado de verificación del usuario
#[derive(Debug, Serialize)]
pub struct VerificationStatusResponse {
    pub phone_verified: bool,
    pub identity_verified: bool,
    pub identity_checks: Vec<IdentityCheckSummary>,
}

/// Resumen de un chequeo de identidad
#[derive(Debug, Serialize)]
pub struct IdentityCheckSummary {
    pub kind: String,
    pub status: String,
    pub score: Option<f64>,
    pub created_at: String,
}

impl From<IdentityVerification> for IdentityCheckSummary {
    fn from(v: IdentityVerification) -> Self {
        Self {
            kind: v.kind,
            status: v.status,
            score: v.score,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}
