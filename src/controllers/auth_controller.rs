use crate::dto::common::ApiResponse;
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::validate_email;
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct AuthController {
    repository: UserRepository,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt,
        }
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;

        if validate_email(&request.email).is_err() {
            return Err(AppError::ValidationError("Email inválido".to_string()));
        }

        // Verificar que el email no exista
        if self.repository.email_exists(&request.email).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        // Hash de la contraseña
        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error hashing password: {}", e)))?;

        let user = self
            .repository
            .create(
                request.email.trim().to_lowercase(),
                password_hash,
                request.display_name,
                request.phone,
            )
            .await?;

        log::info!("👤 Usuario registrado: {}", user.email);

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Usuario registrado exitosamente".to_string(),
        ))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        // Buscar usuario por email
        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        // Verificar contraseña
        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Error verifying password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        // Generar JWT token
        let token = generate_token(user.id, &user.email, &user.role, &self.jwt)?;

        Ok(LoginResponse {
            success: true,
            token,
            user: UserResponse::from(user),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok(UserResponse::from(user))
    }
}
