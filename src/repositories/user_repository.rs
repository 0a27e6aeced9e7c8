use crate::models::user::User;
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: String,
        password_hash: String,
        display_name: String,
        phone: Option<String>,
    ) -> Result<User, AppError> {
        let id = Uuid::new_v4();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, display_name, phone, role, phone_verified, identity_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, 'user', false, false, $6)
            RETURNING *
            "#
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating user: {}", e)))?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding user: {}", e)))?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding user by email: {}", e)))?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error checking email: {}", e)))?;

        Ok(result.0)
    }

    pub async fn set_phone_verified(&self, id: Uuid, phone: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET phone = $2, phone_verified = true WHERE id = $1")
            .bind(id)
            .bind(phone)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error updating phone status: {}", e)))?;

        Ok(())
    }

    pub async fn set_identity_verified(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET identity_verified = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error updating identity status: {}", e)))?;

        Ok(())
    }
}
