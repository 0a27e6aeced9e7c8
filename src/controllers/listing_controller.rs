use crate::dto::common::ApiResponse;
use crate::models::listing::{
    CreateListingRequest, ListingFilters, ListingResponse, UpdateListingRequest, LISTING_STATUSES,
};
use crate::repositories::listing_repository::ListingRepository;
use crate::services::geo;
use crate::services::vin_service;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_coordinates;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct ListingController {
    repository: ListingRepository,
    vin_strict_checksum: bool,
}

impl ListingController {
    pub fn new(pool: PgPool, vin_strict_checksum: bool) -> Self {
        Self {
            repository: ListingRepository::new(pool),
            vin_strict_checksum,
        }
    }

    pub async fn create(
        &self,
        seller_id: Uuid,
        request: CreateListingRequest,
    ) -> Result<ApiResponse<ListingResponse>, AppError> {
        request.validate()?;

        if validate_coordinates(request.latitude, request.longitude).is_err() {
            return Err(AppError::ValidationError(
                "Coordenadas fuera de rango".to_string(),
            ));
        }

        if request.price <= rust_decimal::Decimal::ZERO {
            return Err(AppError::ValidationError(
                "El precio debe ser mayor que cero".to_string(),
            ));
        }

        // El VIN es opcional; si viene tiene que ser estructuralmente válido
        let vin = match &request.vin {
            Some(candidate) if !candidate.trim().is_empty() => {
                let validation = vin_service::validate_vin(candidate, self.vin_strict_checksum);
                if !validation.is_valid {
                    return Err(AppError::ValidationError(format!(
                        "VIN inválido: {}",
                        validation.errors.join("; ")
                    )));
                }
                Some(validation.vin)
            }
            _ => None,
        };

        let listing = self.repository.create(seller_id, &request, vin).await?;

        log::info!("🏍️ Anuncio creado: {} ({})", listing.title, listing.id);

        Ok(ApiResponse::success_with_message(
            ListingResponse::from_listing(listing, None),
            "Anuncio creado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ListingResponse, AppError> {
        let listing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Anuncio no encontrado".to_string()))?;

        if listing.status == "removed" {
            return Err(AppError::NotFound("Anuncio no encontrado".to_string()));
        }

        Ok(ListingResponse::from_listing(listing, None))
    }

    pub async fn search(&self, filters: ListingFilters) -> Result<Vec<ListingResponse>, AppError> {
        let listings = self.repository.search(&filters).await?;

        // Filtro por radio en memoria: la búsqueda geográfica es deliberadamente simple
        let responses = match (filters.latitude, filters.longitude, filters.radius_km) {
            (Some(lat), Some(lng), Some(radius)) => {
                geo::rank_by_distance(listings, lat, lng, radius, |l| (l.latitude, l.longitude))
                    .into_iter()
                    .map(|(listing, distance)| {
                        ListingResponse::from_listing(listing, Some((distance * 10.0).round() / 10.0))
                    })
                    .collect()
            }
            _ => listings
                .into_iter()
                .map(|listing| ListingResponse::from_listing(listing, None))
                .collect(),
        };

        Ok(responses)
    }

    pub async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<ListingResponse>, AppError> {
        let listings = self.repository.find_by_seller(seller_id).await?;

        Ok(listings
            .into_iter()
            .map(|listing| ListingResponse::from_listing(listing, None))
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        seller_id: Uuid,
        request: UpdateListingRequest,
    ) -> Result<ApiResponse<ListingResponse>, AppError> {
        request.validate()?;

        if let Some(status) = &request.status {
            if !LISTING_STATUSES.contains(&status.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Estado de anuncio inválido: {}",
                    status
                )));
            }
        }

        let listing = self.repository.update(id, seller_id, &request).await?;

        Ok(ApiResponse::success_with_message(
            ListingResponse::from_listing(listing, None),
            "Anuncio actualizado exitosamente".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid, seller_id: Uuid) -> Result<(), AppError> {
        let listing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Anuncio no encontrado".to_string()))?;

        if listing.seller_id != seller_id {
            return Err(AppError::Forbidden(
                "El anuncio no pertenece a este usuario".to_string(),
            ));
        }

        // Baja lógica, la fila se conserva
        self.repository.set_status(id, "removed").await?;

        Ok(())
    }
}
