//! Chequeo de disponibilidad de encuentros
//!
//! Dado (zona, usuario, inicio propuesto, duración) determina si la franja
//! está libre. Se evalúan en orden: estado de la zona, horario de apertura,
//! solapamiento con otros encuentros de la zona y, además (nunca en lugar
//! de lo anterior), el conflicto personal del solicitante en cualquier zona
//! dentro de un buffer fijo de una hora.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::meeting::MeetingConflict;
use crate::models::safe_zone::{SafeZone, WeeklyHours};
use crate::repositories::meeting_repository::MeetingRepository;
use crate::utils::errors::AppError;

/// Buffer del conflicto personal: otro encuentro del usuario a menos de
/// una hora del inicio propuesto bloquea la reserva
pub const PERSONAL_CONFLICT_BUFFER_MINUTES: i64 = 60;

/// Qué regla rechazó la franja
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    ZoneInactive,
    OutsideOperatingHours,
    SlotTaken,
    UserConflict,
}

/// Resultado del chequeo de disponibilidad
#[derive(Debug)]
pub struct AvailabilityOutcome {
    pub available: bool,
    pub reason: Option<String>,
    pub rejected_by: Option<UnavailableReason>,
    pub conflicts: Vec<MeetingConflict>,
}

impl AvailabilityOutcome {
    fn available() -> Self {
        Self {
            available: true,
            reason: None,
            rejected_by: None,
            conflicts: Vec::new(),
        }
    }

    fn unavailable(
        rejected_by: UnavailableReason,
        reason: String,
        conflicts: Vec<MeetingConflict>,
    ) -> Self {
        Self {
            available: false,
            reason: Some(reason),
            rejected_by: Some(rejected_by),
            conflicts,
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// Verificar que el instante propuesto cae dentro de la ventana [open, close)
/// del día correspondiente. Devuelve la razón descriptiva si no.
pub fn within_operating_hours(hours: &WeeklyHours, at: DateTime<Utc>) -> Result<(), String> {
    let weekday = at.weekday();
    let day = hours.for_weekday(weekday);

    if day.closed {
        return Err(format!("La zona está cerrada los {}", weekday_name(weekday)));
    }

    let (open_str, close_str) = match (&day.open, &day.close) {
        (Some(open), Some(close)) => (open, close),
        _ => {
            return Err(format!(
                "La zona no tiene horario configurado para los {}",
                weekday_name(weekday)
            ))
        }
    };

    let open = NaiveTime::parse_from_str(open_str, "%H:%M")
        .map_err(|_| format!("Horario de apertura inválido: {}", open_str))?;
    let close = NaiveTime::parse_from_str(close_str, "%H:%M")
        .map_err(|_| format!("Horario de cierre inválido: {}", close_str))?;

    let requested = NaiveTime::from_hms_opt(at.hour(), at.minute(), 0)
        .ok_or_else(|| "Hora solicitada inválida".to_string())?;

    if requested < open || requested >= close {
        return Err(format!(
            "Fuera del horario de apertura del {} ({} - {})",
            weekday_name(weekday),
            open_str,
            close_str
        ));
    }

    Ok(())
}

pub struct AvailabilityService {
    pool: PgPool,
}

impl AvailabilityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ejecutar los cuatro chequeos en orden. Disponible solo si todos pasan.
    pub async fn check(
        &self,
        zone: &SafeZone,
        user_id: Uuid,
        proposed_start: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<AvailabilityOutcome, AppError> {
        // 1. Estado de la zona
        if zone.status != "active" {
            return Ok(AvailabilityOutcome::unavailable(
                UnavailableReason::ZoneInactive,
                format!("La zona '{}' no está activa", zone.name),
                Vec::new(),
            ));
        }

        // 2. Horario de apertura
        if let Err(reason) = within_operating_hours(&zone.operating_hours.0, proposed_start) {
            return Ok(AvailabilityOutcome::unavailable(
                UnavailableReason::OutsideOperatingHours,
                reason,
                Vec::new(),
            ));
        }

        let repository = MeetingRepository::new(self.pool.clone());
        let proposed_end = proposed_start + Duration::minutes(duration_minutes as i64);

        // 3. Solapamiento con encuentros vivos de la zona
        let overlapping = repository
            .find_overlapping(zone.id, proposed_start, proposed_end)
            .await?;
        if !overlapping.is_empty() {
            let conflicts = overlapping.iter().map(MeetingConflict::from).collect();
            return Ok(AvailabilityOutcome::unavailable(
                UnavailableReason::SlotTaken,
                "El horario solicitado se solapa con otro encuentro en la zona".to_string(),
                conflicts,
            ));
        }

        // 4. Conflicto personal del solicitante (cualquier zona)
        let personal = repository
            .find_user_conflicts(user_id, proposed_start, PERSONAL_CONFLICT_BUFFER_MINUTES)
            .await?;
        if !personal.is_empty() {
            let conflicts = personal.iter().map(MeetingConflict::from).collect();
            return Ok(AvailabilityOutcome::unavailable(
                UnavailableReason::UserConflict,
                format!(
                    "Ya tienes otro encuentro a menos de {} minutos del horario propuesto",
                    PERSONAL_CONFLICT_BUFFER_MINUTES
                ),
                conflicts,
            ));
        }

        Ok(AvailabilityOutcome::available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::safe_zone::DayHours;
    use chrono::TimeZone;

    fn business_hours() -> WeeklyHours {
        WeeklyHours {
            monday: DayHours::window("09:00", "17:00"),
            tuesday: DayHours::window("09:00", "17:00"),
            wednesday: DayHours::window("09:00", "17:00"),
            thursday: DayHours::window("09:00", "17:00"),
            friday: DayHours::window("09:00", "17:00"),
            saturday: DayHours::window("10:00", "14:00"),
            sunday: DayHours::closed_day(),
        }
    }

    #[test]
    fn test_monday_evening_is_outside_hours() {
        // 2025-06-02 es lunes
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 20, 0, 0).unwrap();
        let result = within_operating_hours(&business_hours(), at);
        let reason = result.unwrap_err();
        assert!(reason.contains("09:00 - 17:00"), "reason: {}", reason);
    }

    #[test]
    fn test_monday_morning_is_within_hours() {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 10, 30, 0).unwrap();
        assert!(within_operating_hours(&business_hours(), at).is_ok());
    }

    #[test]
    fn test_open_boundary_is_inclusive_close_exclusive() {
        let at_open = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        assert!(within_operating_hours(&business_hours(), at_open).is_ok());

        // La ventana es [open, close): a la hora de cierre ya no hay entrada
        let at_close = Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap();
        assert!(within_operating_hours(&business_hours(), at_close).is_err());
    }

    #[test]
    fn test_closed_day_is_rejected() {
        // 2025-06-08 es domingo
        let at = Utc.with_ymd_and_hms(2025, 6, 8, 11, 0, 0).unwrap();
        let reason = within_operating_hours(&business_hours(), at).unwrap_err();
        assert!(reason.contains("domingo"));
    }
}
