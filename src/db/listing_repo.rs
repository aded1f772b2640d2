// src/db/listing_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ListingStore,
    models::catalog::{Listing, ListingType, Room},
};

pub(crate) const LISTING_COLUMNS: &str = r#"
    id, city, hotel_name, address, kind, amenities, rating,
    main_image, sub_images, owner_id, rooms
"#;

// Linha da tabela 'hotels'; os quartos ficam num JSONB embutido
#[derive(Debug, FromRow)]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub city: String,
    pub hotel_name: String,
    pub address: Option<String>,
    pub kind: ListingType,
    pub amenities: Vec<String>,
    pub rating: Option<f64>,
    pub main_image: Option<String>,
    pub sub_images: Vec<String>,
    pub owner_id: Option<Uuid>,
    pub rooms: Json<Vec<Room>>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            city: row.city,
            hotel_name: row.hotel_name,
            address: row.address,
            kind: row.kind,
            amenities: row.amenities,
            rating: row.rating,
            main_image: row.main_image,
            sub_images: row.sub_images,
            owner_id: row.owner_id,
            rooms: row.rooms.0,
        }
    }
}

#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for ListingRepository {
    async fn list_by_city(&self, city: Option<&str>) -> Result<Vec<Listing>, AppError> {
        let sql = format!(
            "SELECT {} FROM hotels WHERE ($1::TEXT IS NULL OR city = $1) ORDER BY created_at ASC, id ASC",
            LISTING_COLUMNS
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(city)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let sql = format!("SELECT {} FROM hotels WHERE id = $1", LISTING_COLUMNS);
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Listing::from))
    }

    // Cidades distintas na ordem em que aparecem pela primeira vez
    async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        let cities = sqlx::query_scalar::<_, String>(
            r#"
            SELECT city FROM hotels
            GROUP BY city
            ORDER BY MIN(created_at) ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cities)
    }
}
