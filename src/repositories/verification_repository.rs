use crate::models::verification::{IdentityVerification, PhoneOtp, StolenVehicleRecord};
use crate::services::stolen_vehicle_service::StolenVehicleReport;
use crate::utils::errors::AppError;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VerificationRepository {
    pool: PgPool,
}

impl VerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Búsqueda exacta en el registro local de vehículos robados
    pub async fn find_stolen_record(
        &self,
        vin: &str,
    ) -> Result<Option<StolenVehicleRecord>, AppError> {
        let record = sqlx::query_as::<_, StolenVehicleRecord>(
            "SELECT * FROM stolen_vehicle_registry WHERE vin = $1",
        )
        .bind(vin)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error querying stolen registry: {}", e)))?;

        Ok(record)
    }

    /// Upsert del historial de verificaciones por VIN (last-write-wins)
    pub async fn upsert_vin_verification(
        &self,
        report: &StolenVehicleReport,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO vin_verifications (vin, is_stolen, source, report_id, reported_date, vehicle_info, last_checked)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (vin) DO UPDATE
            SET is_stolen = EXCLUDED.is_stolen,
                source = EXCLUDED.source,
                report_id = EXCLUDED.report_id,
                reported_date = EXCLUDED.reported_date,
                vehicle_info = EXCLUDED.vehicle_info,
                last_checked = EXCLUDED.last_checked
            "#,
        )
        .bind(&report.vin)
        .bind(report.is_stolen)
        .bind(report.source.as_str())
        .bind(&report.report_id)
        .bind(report.reported_date)
        .bind(Json(report.vehicle_info.clone()))
        .bind(report.last_checked)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error upserting VIN verification: {}", e)))?;

        Ok(())
    }

    pub async fn create_identity_verification(
        &self,
        user_id: Uuid,
        kind: &str,
        status: &str,
        score: Option<f64>,
    ) -> Result<IdentityVerification, AppError> {
        let verification = sqlx::query_as::<_, IdentityVerification>(
            r#"
            INSERT INTO identity_verifications (id, user_id, kind, status, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(kind)
        .bind(status)
        .bind(score)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating identity verification: {}", e)))?;

        Ok(verification)
    }

    pub async fn list_identity_verifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<IdentityVerification>, AppError> {
        let verifications = sqlx::query_as::<_, IdentityVerification>(
            "SELECT * FROM identity_verifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing identity verifications: {}", e)))?;

        Ok(verifications)
    }

    /// Crear un OTP nuevo descartando los pendientes del usuario
    pub async fn create_otp(
        &self,
        user_id: Uuid,
        phone: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PhoneOtp, AppError> {
        sqlx::query("DELETE FROM phone_otps WHERE user_id = $1 AND verified = false")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error clearing pending OTPs: {}", e)))?;

        let otp = sqlx::query_as::<_, PhoneOtp>(
            r#"
            INSERT INTO phone_otps (id, user_id, phone, code, expires_at, attempts, verified, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, false, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(phone)
        .bind(code)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating OTP: {}", e)))?;

        Ok(otp)
    }

    pub async fn find_active_otp(
        &self,
        user_id: Uuid,
        phone: &str,
    ) -> Result<Option<PhoneOtp>, AppError> {
        let otp = sqlx::query_as::<_, PhoneOtp>(
            r#"
            SELECT * FROM phone_otps
            WHERE user_id = $1 AND phone = $2 AND verified = false AND expires_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(phone)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error finding OTP: {}", e)))?;

        Ok(otp)
    }

    pub async fn increment_otp_attempts(&self, id: Uuid) -> Result<i32, AppError> {
        let result: (i32,) = sqlx::query_as(
            "UPDATE phone_otps SET attempts = attempts + 1 WHERE id = $1 RETURNING attempts",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating OTP attempts: {}", e)))?;

        Ok(result.0)
    }

    pub async fn mark_otp_verified(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE phone_otps SET verified = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error marking OTP verified: {}", e)))?;

        Ok(())
    }
}
