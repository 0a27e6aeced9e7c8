//! Modelo de SafeZone
//!
//! Este módulo contiene el struct SafeZone (punto de encuentro verificado)
//! con su horario semanal de apertura. El horario se guarda como JSONB.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Horario de un día: cerrado, o ventana [open, close) en formato "HH:MM"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default)]
    pub closed: bool,
    pub open: Option<String>,
    pub close: Option<String>,
}

impl DayHours {
    pub fn window(open: &str, close: &str) -> Self {
        Self {
            closed: false,
            open: Some(open.to_string()),
            close: Some(close.to_string()),
        }
    }

    pub fn closed_day() -> Self {
        Self {
            closed: true,
            open: None,
            close: None,
        }
    }
}

/// Horario semanal completo de una zona
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WeeklyHours {
    /// Resolver la entrada de horario para un día de la semana
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

/// SafeZone principal - mapea a la tabla safe_zones
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SafeZone {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub security_level: i32,
    pub operating_hours: Json<WeeklyHours>,
    pub status: String,
    pub total_meetings: i32,
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Request para crear una zona (solo admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSafeZoneRequest {
    #[validate(length(min = 3, max = 120))]
    pub name: String,

    #[validate(length(min = 5, max = 255))]
    pub address: String,

    pub latitude: f64,
    pub longitude: f64,

    #[validate(range(min = 1, max = 5))]
    pub security_level: i32,

    pub operating_hours: WeeklyHours,
}

/// Request para actualizar una zona (solo admin)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSafeZoneRequest {
    #[validate(length(min = 3, max = 120))]
    pub name: Option<String>,

    #[validate(length(min = 5, max = 255))]
    pub address: Option<String>,

    #[validate(range(min = 1, max = 5))]
    pub security_level: Option<i32>,

    pub operating_hours: Option<WeeklyHours>,
}

/// Parámetros de búsqueda de zonas cercanas
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

/// Response de zona para la API
#[derive(Debug, Serialize)]
pub struct SafeZoneResponse {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub security_level: i32,
    pub operating_hours: WeeklyHours,
    pub status: String,
    pub total_meetings: i32,
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub created_at: String,
}

impl SafeZoneResponse {
    pub fn from_zone(zone: SafeZone, distance_km: Option<f64>) -> Self {
        Self {
            id: zone.id.to_string(),
            name: zone.name,
            address: zone.address,
            latitude: zone.latitude,
            longitude: zone.longitude,
            security_level: zone.security_level,
            operating_hours: zone.operating_hours.0,
            status: zone.status,
            total_meetings: zone.total_meetings,
            average_rating: zone.average_rating,
            distance_km,
            created_at: zone.created_at.to_rfc3339(),
        }
    }
}
