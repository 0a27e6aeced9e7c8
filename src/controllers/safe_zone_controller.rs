use crate::dto::common::ApiResponse;
use crate::models::safe_zone::{
    CreateSafeZoneRequest, NearbyQuery, SafeZoneResponse, UpdateSafeZoneRequest, WeeklyHours,
};
use crate::repositories::safe_zone_repository::SafeZoneRepository;
use crate::services::geo;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_coordinates;
use chrono::NaiveTime;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Radio por defecto de la búsqueda de zonas cercanas
const DEFAULT_NEARBY_RADIUS_KM: f64 = 25.0;

pub struct SafeZoneController {
    repository: SafeZoneRepository,
}

/// Validar que cada día abierto tenga ventana "HH:MM" parseable
fn validate_weekly_hours(hours: &WeeklyHours) -> Result<(), AppError> {
    let days = [
        ("lunes", &hours.monday),
        ("martes", &hours.tuesday),
        ("miércoles", &hours.wednesday),
        ("jueves", &hours.thursday),
        ("viernes", &hours.friday),
        ("sábado", &hours.saturday),
        ("domingo", &hours.sunday),
    ];

    for (name, day) in days {
        if day.closed {
            continue;
        }

        let (open, close) = match (&day.open, &day.close) {
            (Some(open), Some(close)) => (open, close),
            _ => {
                return Err(AppError::ValidationError(format!(
                    "El día {} necesita horario de apertura y cierre, o estar marcado como cerrado",
                    name
                )))
            }
        };

        let open_time = NaiveTime::parse_from_str(open, "%H:%M").map_err(|_| {
            AppError::ValidationError(format!("Horario de apertura inválido el {}: {}", name, open))
        })?;
        let close_time = NaiveTime::parse_from_str(close, "%H:%M").map_err(|_| {
            AppError::ValidationError(format!("Horario de cierre inválido el {}: {}", name, close))
        })?;

        if open_time >= close_time {
            return Err(AppError::ValidationError(format!(
                "El horario del {} debe abrir antes de cerrar ({} - {})",
                name, open, close
            )));
        }
    }

    Ok(())
}

impl SafeZoneController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SafeZoneRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateSafeZoneRequest,
    ) -> Result<ApiResponse<SafeZoneResponse>, AppError> {
        request.validate()?;

        if validate_coordinates(request.latitude, request.longitude).is_err() {
            return Err(AppError::ValidationError(
                "Coordenadas fuera de rango".to_string(),
            ));
        }

        validate_weekly_hours(&request.operating_hours)?;

        let zone = self.repository.create(&request).await?;

        log::info!("📍 Zona segura creada: {} ({})", zone.name, zone.id);

        Ok(ApiResponse::success_with_message(
            SafeZoneResponse::from_zone(zone, None),
            "Zona segura creada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<SafeZoneResponse, AppError> {
        let zone = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Zona no encontrada".to_string()))?;

        Ok(SafeZoneResponse::from_zone(zone, None))
    }

    pub async fn list_active(&self) -> Result<Vec<SafeZoneResponse>, AppError> {
        let zones = self.repository.list_active().await?;

        Ok(zones
            .into_iter()
            .map(|zone| SafeZoneResponse::from_zone(zone, None))
            .collect())
    }

    /// Zonas activas dentro del radio, ordenadas por distancia
    pub async fn nearby(&self, query: NearbyQuery) -> Result<Vec<SafeZoneResponse>, AppError> {
        if validate_coordinates(query.latitude, query.longitude).is_err() {
            return Err(AppError::ValidationError(
                "Coordenadas fuera de rango".to_string(),
            ));
        }

        let radius = query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        if radius <= 0.0 || radius > 500.0 {
            return Err(AppError::ValidationError(
                "El radio debe estar entre 0 y 500 km".to_string(),
            ));
        }

        let zones = self.repository.list_active().await?;

        Ok(geo::rank_by_distance(zones, query.latitude, query.longitude, radius, |z| {
            (z.latitude, z.longitude)
        })
        .into_iter()
        .map(|(zone, distance)| {
            SafeZoneResponse::from_zone(zone, Some((distance * 10.0).round() / 10.0))
        })
        .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateSafeZoneRequest,
    ) -> Result<ApiResponse<SafeZoneResponse>, AppError> {
        request.validate()?;

        if let Some(hours) = &request.operating_hours {
            validate_weekly_hours(hours)?;
        }

        let zone = self.repository.update(id, &request).await?;

        Ok(ApiResponse::success_with_message(
            SafeZoneResponse::from_zone(zone, None),
            "Zona actualizada exitosamente".to_string(),
        ))
    }

    /// Baja lógica. Se rechaza mientras existan encuentros vivos en la zona.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let zone = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Zona no encontrada".to_string()))?;

        if self.repository.has_live_meetings(zone.id).await? {
            return Err(AppError::Conflict(
                "La zona tiene encuentros agendados o en curso y no puede darse de baja".to_string(),
            ));
        }

        self.repository.deactivate(zone.id).await?;

        log::info!("📍 Zona segura desactivada: {} ({})", zone.name, zone.id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::safe_zone::DayHours;

    fn open_week() -> WeeklyHours {
        WeeklyHours {
            monday: DayHours::window("09:00", "17:00"),
            tuesday: DayHours::window("09:00", "17:00"),
            wednesday: DayHours::window("09:00", "17:00"),
            thursday: DayHours::window("09:00", "17:00"),
            friday: DayHours::window("09:00", "17:00"),
            saturday: DayHours::closed_day(),
            sunday: DayHours::closed_day(),
        }
    }

    #[test]
    fn test_valid_weekly_hours() {
        assert!(validate_weekly_hours(&open_week()).is_ok());
    }

    #[test]
    fn test_open_day_without_window_is_rejected() {
        let mut hours = open_week();
        hours.monday = DayHours {
            closed: false,
            open: Some("09:00".to_string()),
            close: None,
        };
        assert!(validate_weekly_hours(&hours).is_err());
    }

    #[test]
    fn test_unparseable_time_is_rejected() {
        let mut hours = open_week();
        hours.friday = DayHours::window("9am", "17:00");
        assert!(validate_weekly_hours(&hours).is_err());
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let mut hours = open_week();
        hours.tuesday = DayHours::window("18:00", "09:00");
        assert!(validate_weekly_hours(&hours).is_err());
    }
}
