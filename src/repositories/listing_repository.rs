use crate::models::listing::{CreateListingRequest, Listing, ListingFilters, UpdateListingRequest};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        seller_id: Uuid,
        request: &CreateListingRequest,
        vin: Option<String>,
    ) -> Result<Listing, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (id, seller_id, title, description, make, model, year, mileage_km,
                                  price, vin, latitude, longitude, city, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'active', $14, $14)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(seller_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.make)
        .bind(&request.model)
        .bind(request.year)
        .bind(request.mileage_km)
        .bind(request.price)
        .bind(vin)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(&request.city)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating listing: {}", e)))?;

        Ok(listing)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error finding listing: {}", e)))?;

        Ok(listing)
    }

    /// Búsqueda de anuncios activos con filtros opcionales.
    /// El filtro por radio se aplica en memoria en el controller.
    pub async fn search(&self, filters: &ListingFilters) -> Result<Vec<Listing>, AppError> {
        let limit = filters.limit.unwrap_or(50).clamp(1, 100);
        let offset = filters.offset.unwrap_or(0).max(0);

        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT * FROM listings
            WHERE status = 'active'
              AND ($1::text IS NULL OR lower(make) = lower($1))
              AND ($2::text IS NULL OR lower(model) = lower($2))
              AND ($3::int4 IS NULL OR year >= $3)
              AND ($4::int4 IS NULL OR year <= $4)
              AND ($5::numeric IS NULL OR price >= $5)
              AND ($6::numeric IS NULL OR price <= $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(&filters.make)
        .bind(&filters.model)
        .bind(filters.year_from)
        .bind(filters.year_to)
        .bind(filters.price_min)
        .bind(filters.price_max)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error searching listings: {}", e)))?;

        Ok(listings)
    }

    pub async fn find_by_seller(&self, seller_id: Uuid) -> Result<Vec<Listing>, AppError> {
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing by seller: {}", e)))?;

        Ok(listings)
    }

    pub async fn update(
        &self,
        id: Uuid,
        seller_id: Uuid,
        request: &UpdateListingRequest,
    ) -> Result<Listing, AppError> {
        // Obtener anuncio actual
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Anuncio no encontrado".to_string()))?;

        // Verificar que pertenece al vendedor
        if current.seller_id != seller_id {
            return Err(AppError::Forbidden(
                "El anuncio no pertenece a este usuario".to_string(),
            ));
        }

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET title = $2, description = $3, price = $4, mileage_km = $5, status = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.title.clone().unwrap_or(current.title))
        .bind(request.description.clone().unwrap_or(current.description))
        .bind(request.price.unwrap_or(current.price))
        .bind(request.mileage_km.unwrap_or(current.mileage_km))
        .bind(request.status.clone().unwrap_or(current.status))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error updating listing: {}", e)))?;

        Ok(listing)
    }

    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE listings SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error updating listing status: {}", e)))?;

        Ok(())
    }
}
