// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::catalog::ListingType,
    services::catalog_service::{ListingFilter, ListingSort},
};

#[derive(Debug, Deserialize)]
pub struct ListingsQuery {
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ListingType>,
    pub q: Option<String>,
    pub sort: Option<ListingSort>,
}

// GET /api/cities
pub async fn list_cities(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let cities = app_state
        .catalog_service
        .list_cities()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(cities))
}

// GET /api/listings?city=&type=&q=&sort=
pub async fn list_listings(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ListingFilter {
        city: query.city,
        kind: query.kind,
        query: query.q,
        sort: query.sort,
    };

    let listings = app_state
        .catalog_service
        .list_listings(&filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(listings))
}

// GET /api/listings/{listing_id}
pub async fn get_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .catalog_service
        .get_listing(listing_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(listing))
}
