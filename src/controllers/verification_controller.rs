use crate::config::environment::EnvironmentConfig;
use crate::dto::common::ApiResponse;
use crate::models::verification::{
    IdentityCheckSummary, IdentitySubmissionRequest, SendOtpRequest, StolenCheckSummary,
    VerificationStatusResponse, VerifyOtpRequest, VerifyVinData, VerifyVinRequest,
};
use crate::repositories::user_repository::UserRepository;
use crate::repositories::verification_repository::VerificationRepository;
use crate::services::face_verification_service::FaceVerificationService;
use crate::services::sms_service::SmsService;
use crate::services::stolen_vehicle_service::StolenVehicleService;
use crate::services::vin_service;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_phone;
use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Vigencia del código OTP
const OTP_TTL_MINUTES: i64 = 10;

/// Intentos máximos de verificación por código
const OTP_MAX_ATTEMPTS: i32 = 5;

pub struct VerificationController {
    pool: PgPool,
    config: EnvironmentConfig,
    http_client: reqwest::Client,
    repository: VerificationRepository,
    users: UserRepository,
}

impl VerificationController {
    pub fn new(pool: PgPool, config: EnvironmentConfig, http_client: reqwest::Client) -> Self {
        Self {
            repository: VerificationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
            config,
            http_client,
        }
    }

    /// Validación estructural del VIN + chequeo de robo agregado.
    /// Un VIN estructuralmente inválido devuelve la response con
    /// `is_valid=false` y los errores como alerts, sin tocar servicios
    /// externos.
    pub async fn verify_vin(
        &self,
        request: VerifyVinRequest,
    ) -> Result<ApiResponse<VerifyVinData>, AppError> {
        let validation =
            vin_service::validate_vin(&request.vin, self.config.vin_strict_checksum);

        if !validation.is_valid {
            let mut alerts = validation.errors.clone();
            alerts.extend(validation.warnings.clone());

            return Ok(ApiResponse::success(VerifyVinData {
                vin: validation.vin,
                is_valid: false,
                is_stolen: false,
                vehicle_info: json!({}),
                stolen_check: None,
                alerts,
            }));
        }

        let service =
            StolenVehicleService::new(self.pool.clone(), self.http_client.clone(), &self.config);
        let report = service.check_vin(&validation.vin).await?;

        let mut alerts = validation.warnings.clone();
        if report.is_stolen {
            alerts.push(format!(
                "Vehículo reportado como robado (fuente: {})",
                report.source.as_str()
            ));
        }

        // Pistas decodificadas localmente del propio VIN
        let mut vehicle_info = report.vehicle_info.clone();
        if let Some(fields) = vehicle_info.as_object_mut() {
            if let Some(region) = vin_service::region_hint(&validation.vin) {
                fields.insert("region_hint".to_string(), json!(region));
            }
            if let Some(year) = vin_service::model_year_hint(&validation.vin) {
                fields.insert("model_year_hint".to_string(), json!(year));
            }
        }

        Ok(ApiResponse::success(VerifyVinData {
            vin: validation.vin,
            is_valid: true,
            is_stolen: report.is_stolen,
            vehicle_info,
            stolen_check: Some(StolenCheckSummary {
                source: report.source.as_str().to_string(),
                report_id: report.report_id,
                reported_date: report.reported_date.map(|d| d.to_rfc3339()),
                last_checked: report.last_checked.to_rfc3339(),
            }),
            alerts,
        }))
    }

    /// Generar y enviar un código OTP de 6 dígitos
    pub async fn send_otp(
        &self,
        user_id: Uuid,
        request: SendOtpRequest,
    ) -> Result<ApiResponse<serde_json::Value>, AppError> {
        if validate_phone(&request.phone).is_err() {
            return Err(AppError::ValidationError(
                "Número de teléfono inválido".to_string(),
            ));
        }

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        self.repository
            .create_otp(user_id, &request.phone, &code, expires_at)
            .await?;

        let sms = SmsService::new(self.http_client.clone(), &self.config);
        sms.send_verification_code(&request.phone, &code).await?;

        Ok(ApiResponse::success_with_message(
            json!({ "expires_in_minutes": OTP_TTL_MINUTES }),
            "Código de verificación enviado".to_string(),
        ))
    }

    /// Verificar el código OTP y marcar el teléfono como verificado
    pub async fn verify_otp(
        &self,
        user_id: Uuid,
        request: VerifyOtpRequest,
    ) -> Result<ApiResponse<serde_json::Value>, AppError> {
        let otp = self
            .repository
            .find_active_otp(user_id, &request.phone)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No hay código activo para ese teléfono".to_string())
            })?;

        let attempts = self.repository.increment_otp_attempts(otp.id).await?;
        if attempts > OTP_MAX_ATTEMPTS {
            return Err(AppError::Conflict(
                "Demasiados intentos, solicita un código nuevo".to_string(),
            ));
        }

        if otp.code != request.code {
            return Err(AppError::ValidationError("Código incorrecto".to_string()));
        }

        self.repository.mark_otp_verified(otp.id).await?;
        self.users
            .set_phone_verified(user_id, &request.phone)
            .await?;

        log::info!("📱 Teléfono verificado para usuario {}", user_id);

        Ok(ApiResponse::success_with_message(
            json!({ "phone_verified": true }),
            "Teléfono verificado exitosamente".to_string(),
        ))
    }

    /// Enviar documento + selfie. El face-match corre en modo simulado y
    /// el resultado queda registrado con su score.
    pub async fn submit_identity(
        &self,
        user_id: Uuid,
        request: IdentitySubmissionRequest,
    ) -> Result<ApiResponse<VerificationStatusResponse>, AppError> {
        request.validate()?;

        self.repository
            .create_identity_verification(user_id, "id_photo", "submitted", None)
            .await?;

        let face = FaceVerificationService::new();
        let result = face.verify(&request.document_photo_url, &request.selfie_url);

        let status = if result.passed { "approved" } else { "rejected" };
        self.repository
            .create_identity_verification(user_id, "liveness", status, Some(result.score))
            .await?;

        if result.passed {
            self.users.set_identity_verified(user_id).await?;
            log::info!("🪪 Identidad verificada para usuario {}", user_id);
        }

        let response = self.status(user_id).await?;
        Ok(ApiResponse::success_with_message(
            response,
            if result.passed {
                "Identidad verificada".to_string()
            } else {
                "La verificación facial no alcanzó el umbral, reintenta".to_string()
            },
        ))
    }

    /// Estado agregado de verificación del usuario
    pub async fn status(&self, user_id: Uuid) -> Result<VerificationStatusResponse, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        let checks = self
            .repository
            .list_identity_verifications(user_id)
            .await?;

        Ok(VerificationStatusResponse {
            phone_verified: user.phone_verified,
            identity_verified: user.identity_verified,
            identity_checks: checks.into_iter().map(IdentityCheckSummary::from).collect(),
        })
    }
}
