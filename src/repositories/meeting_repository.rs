use crate::models::meeting::{CreateMeetingRequest, SafeZoneMeeting, LIVE_MEETING_STATUSES};
use crate::utils::errors::AppError;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct MeetingRepository {
    pool: PgPool,
}

/// Clave de advisory lock por zona: los 64 bits altos del UUID
fn zone_lock_key(zone_id: Uuid) -> i64 {
    (zone_id.as_u128() >> 64) as i64
}

impl MeetingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SafeZoneMeeting>, AppError> {
        let meeting =
            sqlx::query_as::<_, SafeZoneMeeting>("SELECT * FROM safe_zone_meetings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Error finding meeting: {}", e)))?;

        Ok(meeting)
    }

    /// Encuentros vivos de la zona cuyo intervalo se solapa con [start, end)
    pub async fn find_overlapping(
        &self,
        zone_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SafeZoneMeeting>, AppError> {
        let meetings = sqlx::query_as::<_, SafeZoneMeeting>(
            r#"
            SELECT * FROM safe_zone_meetings
            WHERE safe_zone_id = $1
              AND status = ANY($4)
              AND scheduled_datetime < $3
              AND scheduled_datetime + make_interval(mins => estimated_duration_minutes) > $2
            ORDER BY scheduled_datetime
            "#,
        )
        .bind(zone_id)
        .bind(start)
        .bind(end)
        .bind(&LIVE_MEETING_STATUSES[..])
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error finding overlapping meetings: {}", e)))?;

        Ok(meetings)
    }

    /// Encuentros vivos del usuario (cualquier zona) dentro del buffer
    /// alrededor del inicio propuesto
    pub async fn find_user_conflicts(
        &self,
        user_id: Uuid,
        proposed_start: DateTime<Utc>,
        buffer_minutes: i64,
    ) -> Result<Vec<SafeZoneMeeting>, AppError> {
        let meetings = sqlx::query_as::<_, SafeZoneMeeting>(
            r#"
            SELECT * FROM safe_zone_meetings
            WHERE (buyer_id = $1 OR seller_id = $1)
              AND status = ANY($4)
              AND scheduled_datetime > $2 - make_interval(mins => $3::int4)
              AND scheduled_datetime < $2 + make_interval(mins => $3::int4)
            ORDER BY scheduled_datetime
            "#,
        )
        .bind(user_id)
        .bind(proposed_start)
        .bind(buffer_minutes as i32)
        .bind(&LIVE_MEETING_STATUSES[..])
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error finding user conflicts: {}", e)))?;

        Ok(meetings)
    }

    /// Crear el encuentro con el chequeo de solapamiento y el insert dentro
    /// de la misma transacción, serializados por zona con un advisory lock.
    /// Dos requests simultáneas por la misma franja no pueden pasar ambas:
    /// la segunda espera el lock y ve el insert de la primera.
    pub async fn create_locked(
        &self,
        request: &CreateMeetingRequest,
    ) -> Result<SafeZoneMeeting, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error starting transaction: {}", e)))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(zone_lock_key(request.safe_zone_id))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error acquiring zone lock: {}", e)))?;

        let end = request.scheduled_datetime
            + chrono::Duration::minutes(request.estimated_duration as i64);

        let overlapping: Vec<SafeZoneMeeting> = sqlx::query_as(
            r#"
            SELECT * FROM safe_zone_meetings
            WHERE safe_zone_id = $1
              AND status = ANY($4)
              AND scheduled_datetime < $3
              AND scheduled_datetime + make_interval(mins => estimated_duration_minutes) > $2
            "#,
        )
        .bind(request.safe_zone_id)
        .bind(request.scheduled_datetime)
        .bind(end)
        .bind(&LIVE_MEETING_STATUSES[..])
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error re-checking availability: {}", e)))?;

        if !overlapping.is_empty() {
            return Err(AppError::business(
                StatusCode::CONFLICT,
                "TIME_SLOT_UNAVAILABLE",
                "El horario solicitado acaba de ser reservado por otro usuario",
            ));
        }

        let meeting = sqlx::query_as::<_, SafeZoneMeeting>(
            r#"
            INSERT INTO safe_zone_meetings (id, safe_zone_id, listing_id, buyer_id, seller_id,
                                            scheduled_datetime, estimated_duration_minutes, status,
                                            buyer_checked_in, seller_checked_in, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'scheduled', false, false, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.safe_zone_id)
        .bind(request.listing_id)
        .bind(request.buyer_id)
        .bind(request.seller_id)
        .bind(request.scheduled_datetime)
        .bind(request.estimated_duration)
        .bind(&request.notes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating meeting: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error committing meeting: {}", e)))?;

        Ok(meeting)
    }

    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<SafeZoneMeeting>, AppError> {
        let meetings = sqlx::query_as::<_, SafeZoneMeeting>(
            r#"
            SELECT * FROM safe_zone_meetings
            WHERE buyer_id = $1 OR seller_id = $1
            ORDER BY scheduled_datetime DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing meetings: {}", e)))?;

        Ok(meetings)
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<SafeZoneMeeting, AppError> {
        let meeting = sqlx::query_as::<_, SafeZoneMeeting>(
            "UPDATE safe_zone_meetings SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating meeting status: {}", e)))?;

        Ok(meeting)
    }

    /// Registrar el check-in de comprador o vendedor
    pub async fn check_in(&self, id: Uuid, as_buyer: bool) -> Result<SafeZoneMeeting, AppError> {
        let query = if as_buyer {
            r#"
            UPDATE safe_zone_meetings
            SET buyer_checked_in = true, buyer_checked_in_at = $2
            WHERE id = $1
            RETURNING *
            "#
        } else {
            r#"
            UPDATE safe_zone_meetings
            SET seller_checked_in = true, seller_checked_in_at = $2
            WHERE id = $1
            RETURNING *
            "#
        };

        let meeting = sqlx::query_as::<_, SafeZoneMeeting>(query)
            .bind(id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error registering check-in: {}", e)))?;

        Ok(meeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_lock_key_is_deterministic() {
        let zone_id = Uuid::new_v4();
        assert_eq!(zone_lock_key(zone_id), zone_lock_key(zone_id));
    }

    #[test]
    fn test_zone_lock_key_differs_between_zones() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        // Los 64 bits altos de dos UUID v4 distintos prácticamente nunca coinciden
        assert_ne!(zone_lock_key(a), zone_lock_key(b));
    }

    /// El patrón check-then-insert en dos llamadas separadas permite que dos
    /// requests simultáneas reserven la misma franja. create_locked cierra
    /// esa carrera serializando por zona con pg_advisory_xact_lock: de dos
    /// reservas concurrentes idénticas exactamente una debe prosperar.
    #[tokio::test]
    #[ignore] // requiere DATABASE_URL con schema.sql cargado
    async fn test_concurrent_bookings_cannot_double_book() {
        use chrono::{Duration, Utc};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = sqlx::PgPool::connect(&url).await.expect("db connection");

        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        let zone_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        for (id, email) in [(buyer, "buyer"), (seller, "seller")] {
            sqlx::query(
                "INSERT INTO users (id, email, password_hash, display_name) VALUES ($1, $2, 'x', $2)",
            )
            .bind(id)
            .bind(format!("{}-{}@test.example", email, id))
            .execute(&pool)
            .await
            .expect("seed user");
        }

        sqlx::query(
            r#"
            INSERT INTO safe_zones (id, name, address, latitude, longitude, security_level, operating_hours)
            VALUES ($1, 'Zona test', 'Calle 1', 0.0, 0.0, 3, '{}'::jsonb)
            "#,
        )
        .bind(zone_id)
        .execute(&pool)
        .await
        .expect("seed zone");

        sqlx::query(
            r#"
            INSERT INTO listings (id, seller_id, title, description, make, model, year, mileage_km,
                                  price, latitude, longitude, city)
            VALUES ($1, $2, 'Moto test', 'descripción de prueba', 'Honda', 'CB500', 2020, 10000,
                    4500.00, 0.0, 0.0, 'Madrid')
            "#,
        )
        .bind(listing_id)
        .bind(seller)
        .execute(&pool)
        .await
        .expect("seed listing");

        let start = Utc::now() + Duration::days(7);
        let request = CreateMeetingRequest {
            safe_zone_id: zone_id,
            listing_id,
            buyer_id: buyer,
            seller_id: seller,
            scheduled_datetime: start,
            estimated_duration: 60,
            notes: None,
        };

        let repo_a = MeetingRepository::new(pool.clone());
        let repo_b = MeetingRepository::new(pool.clone());

        let (first, second) = tokio::join!(
            repo_a.create_locked(&request),
            repo_b.create_locked(&request)
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactamente una reserva debe prosperar");

        let loser = if first.is_ok() { second } else { first };
        match loser {
            Err(AppError::Business { code, .. }) => assert_eq!(code, "TIME_SLOT_UNAVAILABLE"),
            other => panic!("se esperaba TIME_SLOT_UNAVAILABLE, se obtuvo {:?}", other.is_ok()),
        }
    }
}
