//! Modelo de Listing
//!
//! Este módulo contiene el struct Listing (anuncio de moto) y sus variantes
//! para CRUD operations. La ubicación exacta del vendedor nunca se expone:
//! las responses llevan coordenadas aproximadas por privacidad.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::geo::ApproximateLocation;

/// Listing principal - mapea a la tabla listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage_km: i32,
    pub price: Decimal,
    pub vin: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un anuncio
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 5, max = 120))]
    pub title: String,

    #[validate(length(min = 10, max = 5000))]
    pub description: String,

    #[validate(length(min = 2, max = 60))]
    pub make: String,

    #[validate(length(min = 1, max = 60))]
    pub model: String,

    #[validate(range(min = 1900, max = 2030))]
    pub year: i32,

    #[validate(range(min = 0, max = 1_000_000))]
    pub mileage_km: i32,

    pub price: Decimal,

    pub vin: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    #[validate(length(min = 2, max = 100))]
    pub city: String,
}

/// Request para actualizar un anuncio existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 5, max = 120))]
    pub title: Option<String>,

    #[validate(length(min = 10, max = 5000))]
    pub description: Option<String>,

    pub price: Option<Decimal>,

    #[validate(range(min = 0, max = 1_000_000))]
    pub mileage_km: Option<i32>,

    pub status: Option<String>,
}

/// Filtros para búsqueda de anuncios
#[derive(Debug, Deserialize)]
pub struct ListingFilters {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    // Búsqueda por cercanía (requiere los tres campos)
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de anuncio para la API - la ubicación se aproxima por privacidad
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub description: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage_km: i32,
    pub price: String,
    pub vin: Option<String>,
    pub location: ApproximateLocation,
    pub city: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub created_at: String,
}

impl ListingResponse {
    pub fn from_listing(listing: Listing, distance_km: Option<f64>) -> Self {
        let location =
            crate::services::geo::approximate_location(listing.latitude, listing.longitude);
        Self {
            id: listing.id.to_string(),
            seller_id: listing.seller_id.to_string(),
            title: listing.title,
            description: listing.description,
            make: listing.make,
            model: listing.model,
            year: listing.year,
            mileage_km: listing.mileage_km,
            price: listing.price.to_string(),
            vin: listing.vin,
            location,
            city: listing.city,
            status: listing.status,
            distance_km,
            created_at: listing.created_at.to_rfc3339(),
        }
    }
}

/// Estados válidos de un anuncio
pub const LISTING_STATUSES: [&str; 4] = ["active", "pending_sale", "sold", "removed"];
