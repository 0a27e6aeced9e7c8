use crate::dto::common::ApiResponse;
use crate::models::meeting::{
    AvailabilityRequest, AvailabilityResponse, CreateMeetingRequest, MeetingResponse,
    SafeZoneSummary,
};
use crate::repositories::listing_repository::ListingRepository;
use crate::repositories::meeting_repository::MeetingRepository;
use crate::repositories::safe_zone_repository::SafeZoneRepository;
use crate::services::availability_service::{AvailabilityService, UnavailableReason};
use crate::utils::errors::AppError;
use axum::http::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct MeetingController {
    pool: PgPool,
    meetings: MeetingRepository,
    safe_zones: SafeZoneRepository,
    listings: ListingRepository,
}

impl MeetingController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            meetings: MeetingRepository::new(pool.clone()),
            safe_zones: SafeZoneRepository::new(pool.clone()),
            listings: ListingRepository::new(pool.clone()),
            pool,
        }
    }

    /// Chequeo de disponibilidad sin reservar
    pub async fn availability(
        &self,
        user_id: Uuid,
        request: AvailabilityRequest,
    ) -> Result<AvailabilityResponse, AppError> {
        if request.duration_minutes < 15 || request.duration_minutes > 240 {
            return Err(AppError::ValidationError(
                "La duración debe estar entre 15 y 240 minutos".to_string(),
            ));
        }

        let zone = self
            .safe_zones
            .find_by_id(request.safe_zone_id)
            .await?
            .ok_or_else(|| {
                AppError::business(
                    StatusCode::NOT_FOUND,
                    "SAFE_ZONE_NOT_FOUND",
                    "Zona segura no encontrada",
                )
            })?;

        let outcome = AvailabilityService::new(self.pool.clone())
            .check(&zone, user_id, request.datetime, request.duration_minutes)
            .await?;

        Ok(AvailabilityResponse {
            available: outcome.available,
            reason: outcome.reason,
            safe_zone: SafeZoneSummary::from(&zone),
            requested_time: request.datetime.to_rfc3339(),
            duration: request.duration_minutes,
            conflicts: outcome.conflicts,
        })
    }

    /// Agendar un encuentro. El chequeo de disponibilidad se repite dentro
    /// de la transacción de inserción, serializado por zona.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateMeetingRequest,
    ) -> Result<ApiResponse<MeetingResponse>, AppError> {
        request.validate()?;

        if request.buyer_id == request.seller_id {
            return Err(AppError::ValidationError(
                "Comprador y vendedor no pueden ser el mismo usuario".to_string(),
            ));
        }

        // Solo comprador o vendedor pueden agendar
        if user_id != request.buyer_id && user_id != request.seller_id {
            return Err(AppError::Forbidden(
                "Solo el comprador o el vendedor pueden agendar el encuentro".to_string(),
            ));
        }

        let zone = self
            .safe_zones
            .find_by_id(request.safe_zone_id)
            .await?
            .ok_or_else(|| {
                AppError::business(
                    StatusCode::NOT_FOUND,
                    "SAFE_ZONE_NOT_FOUND",
                    "Zona segura no encontrada",
                )
            })?;

        if zone.status != "active" {
            return Err(AppError::business(
                StatusCode::CONFLICT,
                "SAFE_ZONE_INACTIVE",
                format!("La zona '{}' no está activa", zone.name),
            ));
        }

        let listing = self
            .listings
            .find_by_id(request.listing_id)
            .await?
            .ok_or_else(|| {
                AppError::business(
                    StatusCode::NOT_FOUND,
                    "LISTING_NOT_FOUND",
                    "Anuncio no encontrado",
                )
            })?;

        if listing.seller_id != request.seller_id {
            return Err(AppError::business(
                StatusCode::BAD_REQUEST,
                "INVALID_SELLER",
                "El vendedor indicado no coincide con el dueño del anuncio",
            ));
        }

        let outcome = AvailabilityService::new(self.pool.clone())
            .check(
                &zone,
                user_id,
                request.scheduled_datetime,
                request.estimated_duration,
            )
            .await?;

        if !outcome.available {
            let reason = outcome
                .reason
                .unwrap_or_else(|| "Franja no disponible".to_string());
            return Err(match outcome.rejected_by {
                Some(UnavailableReason::ZoneInactive) => {
                    AppError::business(StatusCode::CONFLICT, "SAFE_ZONE_INACTIVE", reason)
                }
                Some(UnavailableReason::UserConflict) => {
                    AppError::business(StatusCode::CONFLICT, "USER_CONFLICT", reason)
                }
                _ => AppError::business(StatusCode::CONFLICT, "TIME_SLOT_UNAVAILABLE", reason),
            });
        }

        let meeting = self.meetings.create_locked(&request).await?;

        log::info!(
            "🤝 Encuentro agendado en zona {} para {}",
            zone.name,
            meeting.scheduled_datetime
        );

        Ok(ApiResponse::success_with_message(
            MeetingResponse::from(meeting),
            "Encuentro agendado exitosamente".to_string(),
        ))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MeetingResponse>, AppError> {
        let meetings = self.meetings.find_for_user(user_id).await?;
        Ok(meetings.into_iter().map(MeetingResponse::from).collect())
    }

    /// Check-in de un participante. Un solo check-in confirma el encuentro;
    /// con ambos pasa a in_progress.
    pub async fn check_in(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> Result<MeetingResponse, AppError> {
        let meeting = self
            .meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Encuentro no encontrado".to_string()))?;

        if !meeting.is_participant(user_id) {
            return Err(AppError::Forbidden(
                "No participas de este encuentro".to_string(),
            ));
        }

        if !meeting.is_live() {
            return Err(AppError::Conflict(format!(
                "El encuentro está en estado '{}' y no admite check-in",
                meeting.status
            )));
        }

        let as_buyer = meeting.buyer_id == user_id;
        let meeting = self.meetings.check_in(meeting_id, as_buyer).await?;

        let next_status = if meeting.buyer_checked_in && meeting.seller_checked_in {
            "in_progress"
        } else {
            "confirmed"
        };

        let meeting = if meeting.status != next_status {
            self.meetings.update_status(meeting_id, next_status).await?
        } else {
            meeting
        };

        Ok(MeetingResponse::from(meeting))
    }

    /// Completar un encuentro en curso; actualiza el contador de la zona
    pub async fn complete(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> Result<MeetingResponse, AppError> {
        let meeting = self
            .meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Encuentro no encontrado".to_string()))?;

        if !meeting.is_participant(user_id) {
            return Err(AppError::Forbidden(
                "No participas de este encuentro".to_string(),
            ));
        }

        if !(meeting.buyer_checked_in && meeting.seller_checked_in) {
            return Err(AppError::Conflict(
                "Ambas partes deben hacer check-in antes de completar el encuentro".to_string(),
            ));
        }

        let meeting = self.meetings.update_status(meeting_id, "completed").await?;
        self.safe_zones
            .increment_total_meetings(meeting.safe_zone_id)
            .await?;

        Ok(MeetingResponse::from(meeting))
    }

    pub async fn cancel(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> Result<MeetingResponse, AppError> {
        let meeting = self
            .meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Encuentro no encontrado".to_string()))?;

        if !meeting.is_participant(user_id) {
            return Err(AppError::Forbidden(
                "No participas de este encuentro".to_string(),
            ));
        }

        if meeting.status != "scheduled" && meeting.status != "confirmed" {
            return Err(AppError::Conflict(format!(
                "El encuentro está en estado '{}' y ya no puede cancelarse",
                meeting.status
            )));
        }

        let meeting = self.meetings.update_status(meeting_id, "cancelled").await?;
        Ok(MeetingResponse::from(meeting))
    }

    /// Marcar no_show: solo después del horario agendado
    pub async fn no_show(
        &self,
        meeting_id: Uuid,
        user_id: Uuid,
    ) -> Result<MeetingResponse, AppError> {
        let meeting = self
            .meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Encuentro no encontrado".to_string()))?;

        if !meeting.is_participant(user_id) {
            return Err(AppError::Forbidden(
                "No participas de este encuentro".to_string(),
            ));
        }

        if !meeting.is_live() {
            return Err(AppError::Conflict(format!(
                "El encuentro está en estado '{}'",
                meeting.status
            )));
        }

        if meeting.scheduled_datetime > chrono::Utc::now() {
            return Err(AppError::ValidationError(
                "No puede marcarse no_show antes del horario agendado".to_string(),
            ));
        }

        let meeting = self.meetings.update_status(meeting_id, "no_show").await?;
        Ok(MeetingResponse::from(meeting))
    }
}
