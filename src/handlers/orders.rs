// src/handlers/orders.rs

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_not_blank,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::booking::OrderView,
    services::order_service::BookingRequest,
};

// =============================================================================
//  1. COTAÇÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub listing_id: Uuid,

    #[validate(length(min = 1, message = "Vui lòng chọn loại phòng."))]
    pub room_type: String,

    #[validate(range(min = 1, message = "Số lượng phòng phải lớn hơn 0."))]
    pub room_count: i32,

    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
}

// POST /api/bookings/quote
pub async fn quote_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let quote = app_state
        .order_service
        .quote(
            payload.listing_id,
            &payload.room_type,
            payload.room_count,
            payload.check_in_date,
            payload.check_out_date,
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(quote))
}

// =============================================================================
//  2. PEDIDOS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub hotel_id: Uuid,

    #[validate(length(min = 1, message = "Vui lòng chọn loại phòng."))]
    pub room_type: String,

    #[validate(range(min = 1, message = "Số lượng phòng phải lớn hơn 0."))]
    pub room_count: i32,

    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,

    #[validate(custom(function = "validate_not_blank", message = "Vui lòng nhập họ và tên."))]
    pub user_name: String,

    #[validate(custom(function = "validate_not_blank", message = "Vui lòng nhập số điện thoại."))]
    pub phone_number: String,
}

// POST /api/orders
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = BookingRequest {
        hotel_id: payload.hotel_id,
        room_type: payload.room_type,
        room_count: payload.room_count,
        check_in_date: payload.check_in_date,
        check_out_date: payload.check_out_date,
        guest_name: payload.user_name,
        guest_phone: payload.phone_number,
    };

    let order = app_state
        .order_service
        .submit_order(&user, request)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(OrderView::from(order))))
}

// GET /api/orders
pub async fn list_my_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_orders(user.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let views: Vec<OrderView> = orders.into_iter().map(OrderView::from).collect();
    Ok(Json(views))
}

// GET /api/orders/stream (Server-Sent Events, evento "orders" com a lista inteira)
pub async fn stream_my_orders(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = app_state.order_service.watch_orders(user.id).map(|orders| {
        let views: Vec<OrderView> = orders.into_iter().map(OrderView::from).collect();
        let event = Event::default()
            .event("orders")
            .json_data(&views)
            .unwrap_or_else(|e| {
                tracing::error!("Falha ao serializar pedidos: {}", e);
                Event::default().event("error")
            });
        Ok::<_, Infallible>(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// DELETE /api/orders/{order_id}
pub async fn cancel_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .order_service
        .cancel_order(user.id, order_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
