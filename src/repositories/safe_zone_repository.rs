use crate::models::safe_zone::{CreateSafeZoneRequest, SafeZone, UpdateSafeZoneRequest};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct SafeZoneRepository {
    pool: PgPool,
}

impl SafeZoneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateSafeZoneRequest) -> Result<SafeZone, AppError> {
        let id = Uuid::new_v4();

        let zone = sqlx::query_as::<_, SafeZone>(
            r#"
            INSERT INTO safe_zones (id, name, address, latitude, longitude, security_level,
                                    operating_hours, status, total_meetings, average_rating, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', 0, NULL, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.address)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.security_level)
        .bind(Json(request.operating_hours.clone()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating safe zone: {}", e)))?;

        Ok(zone)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SafeZone>, AppError> {
        let zone = sqlx::query_as::<_, SafeZone>("SELECT * FROM safe_zones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding safe zone: {}", e)))?;

        Ok(zone)
    }

    pub async fn list_active(&self) -> Result<Vec<SafeZone>, AppError> {
        let zones = sqlx::query_as::<_, SafeZone>(
            "SELECT * FROM safe_zones WHERE status = 'active' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing safe zones: {}", e)))?;

        Ok(zones)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateSafeZoneRequest,
    ) -> Result<SafeZone, AppError> {
        // Obtener zona actual
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Zona no encontrada".to_string()))?;

        let operating_hours = match &request.operating_hours {
            Some(hours) => Json(hours.clone()),
            None => current.operating_hours,
        };

        let zone = sqlx::query_as::<_, SafeZone>(
            r#"
            UPDATE safe_zones
            SET name = $2, address = $3, security_level = $4, operating_hours = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.clone().unwrap_or(current.name))
        .bind(request.address.clone().unwrap_or(current.address))
        .bind(request.security_level.unwrap_or(current.security_level))
        .bind(operating_hours)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating safe zone: {}", e)))?;

        Ok(zone)
    }

    /// Baja lógica: la zona pasa a inactive, nunca se borra la fila
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE safe_zones SET status = 'inactive' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error deactivating safe zone: {}", e)))?;

        Ok(())
    }

    /// Verificar si la zona tiene encuentros vivos que impiden darla de baja
    pub async fn has_live_meetings(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM safe_zone_meetings
                WHERE safe_zone_id = $1
                  AND status IN ('scheduled', 'confirmed', 'in_progress')
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error checking live meetings: {}", e)))?;

        Ok(result.0)
    }

    /// Incrementar el contador agregado al completarse un encuentro
    pub async fn increment_total_meetings(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE safe_zones SET total_meetings = total_meetings + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error updating meeting counter: {}", e)))?;

        Ok(())
    }
}
