//! Modelo de SafeZoneMeeting
//!
//! Este módulo contiene el struct del encuentro presencial en una zona
//! y sus transiciones de estado via check-in de comprador y vendedor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Estados con los que un encuentro sigue ocupando su franja horaria
pub const LIVE_MEETING_STATUSES: [&str; 3] = ["scheduled", "confirmed", "in_progress"];

/// SafeZoneMeeting principal - mapea a la tabla safe_zone_meetings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SafeZoneMeeting {
    pub id: Uuid,
    pub safe_zone_id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub scheduled_datetime: DateTime<Utc>,
    pub estimated_duration_minutes: i32,
    pub status: String,
    pub buyer_checked_in: bool,
    pub seller_checked_in: bool,
    pub buyer_checked_in_at: Option<DateTime<Utc>>,
    pub seller_checked_in_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SafeZoneMeeting {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    pub fn is_live(&self) -> bool {
        LIVE_MEETING_STATUSES.contains(&self.status.as_str())
    }
}

/// Request de disponibilidad de franja horaria
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub safe_zone_id: Uuid,
    pub datetime: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// Request para agendar un encuentro
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetingRequest {
    pub safe_zone_id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub scheduled_datetime: DateTime<Utc>,

    #[validate(range(min = 15, max = 240))]
    pub estimated_duration: i32,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Conflicto devuelto por el chequeo de disponibilidad
#[derive(Debug, Clone, Serialize)]
pub struct MeetingConflict {
    pub meeting_id: String,
    pub scheduled_datetime: String,
    pub estimated_duration_minutes: i32,
}

impl From<&SafeZoneMeeting> for MeetingConflict {
    fn from(meeting: &SafeZoneMeeting) -> Self {
        Self {
            meeting_id: meeting.id.to_string(),
            scheduled_datetime: meeting.scheduled_datetime.to_rfc3339(),
            estimated_duration_minutes: meeting.estimated_duration_minutes,
        }
    }
}

/// Response del endpoint de disponibilidad
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub safe_zone: SafeZoneSummary,
    pub requested_time: String,
    pub duration: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<MeetingConflict>,
}

/// Resumen de zona incluido en responses de meetings
#[derive(Debug, Serialize)]
pub struct SafeZoneSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub security_level: i32,
}

impl From<&crate::models::safe_zone::SafeZone> for SafeZoneSummary {
    fn from(zone: &crate::models::safe_zone::SafeZone) -> Self {
        Self {
            id: zone.id.to_string(),
            name: zone.name.clone(),
            address: zone.address.clone(),
            security_level: zone.security_level,
        }
    }
}

/// Response de encuentro para la API
#[derive(Debug, Serialize)]
pub struct MeetingResponse {
    pub id: String,
    pub safe_zone_id: String,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub scheduled_datetime: String,
    pub estimated_duration_minutes: i32,
    pub status: String,
    pub buyer_checked_in: bool,
    pub seller_checked_in: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<SafeZoneMeeting> for MeetingResponse {
    fn from(meeting: SafeZoneMeeting) -> Self {
        Self {
            id: meeting.id.to_string(),
            safe_zone_id: meeting.safe_zone_id.to_string(),
            listing_id: meeting.listing_id.to_string(),
            buyer_id: meeting.buyer_id.to_string(),
            seller_id: meeting.seller_id.to_string(),
            scheduled_datetime: meeting.scheduled_datetime.to_rfc3339(),
            estimated_duration_minutes: meeting.estimated_duration_minutes,
            status: meeting.status,
            buyer_checked_in: meeting.buyer_checked_in,
            seller_checked_in: meeting.seller_checked_in,
            notes: meeting.notes,
            created_at: meeting.created_at.to_rfc3339(),
        }
    }
}
