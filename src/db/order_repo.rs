// src/db/order_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        listing_repo::{ListingRow, LISTING_COLUMNS},
        OrderStore,
    },
    models::{
        booking::{BookingQuote, Order, OrderDraft, OrderStatus},
        catalog::Listing,
    },
    services::booking,
};

const ORDER_COLUMNS: &str = r#"
    id, hotel_id, hotel_name, user_id, hotel_owner_id, user_name, phone_number,
    email, check_in_date, check_out_date, room_type, room_count, total_price,
    status, created_at
"#;

// ---
// Regras aplicadas sobre a hospedagem já travada (compartilhadas com o store em memória)
// ---

/// Revalida o pedido contra o estoque atual, calcula o preço e baixa os quartos.
pub(crate) fn reserve_on_listing(
    listing: &mut Listing,
    draft: &OrderDraft,
) -> Result<BookingQuote, AppError> {
    let room = listing
        .room_mut(&draft.room_type)
        .ok_or_else(|| AppError::RoomNotFound(draft.room_type.clone()))?;

    let quote = booking::quote(
        room,
        draft.room_count,
        draft.check_in_date,
        draft.check_out_date,
    )?;
    room.reserve(draft.room_count)?;

    Ok(quote)
}

/// Devolve os quartos de um pedido removido. Quarto que sumiu do cadastro é ignorado.
pub(crate) fn release_on_listing(listing: &mut Listing, order: &Order) -> bool {
    match listing.room_mut(&order.room_type) {
        Some(room) => {
            room.release(order.room_count);
            true
        }
        None => false,
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_listing(
        tx: &mut Transaction<'_, Postgres>,
        hotel_id: Uuid,
    ) -> Result<Option<Listing>, AppError> {
        let sql = format!("SELECT {} FROM hotels WHERE id = $1 FOR UPDATE", LISTING_COLUMNS);
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(hotel_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(Listing::from))
    }

    async fn save_rooms(
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE hotels SET rooms = $1 WHERE id = $2")
            .bind(Json(&listing.rooms))
            .bind(listing.id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn place_order(&self, draft: OrderDraft) -> Result<Order, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 1. Trava a hospedagem: ninguém mexe no estoque até o commit
        let mut listing = Self::lock_listing(&mut tx, draft.hotel_id)
            .await?
            .ok_or(AppError::ListingNotFound)?;

        // 2. Revalida e baixa o estoque (erro aqui = rollback no drop do tx)
        let quote = reserve_on_listing(&mut listing, &draft)?;
        Self::save_rooms(&mut tx, &listing).await?;

        // 3. Grava o pedido com nome e dono lidos da linha travada
        let sql = format!(
            r#"
            INSERT INTO orders (
                hotel_id, hotel_name, user_id, hotel_owner_id, user_name, phone_number,
                email, check_in_date, check_out_date, room_type, room_count, total_price, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(listing.id)
            .bind(&listing.hotel_name)
            .bind(draft.user_id)
            .bind(listing.owner_id)
            .bind(draft.user_name.trim())
            .bind(draft.phone_number.trim())
            .bind(&draft.email)
            .bind(draft.check_in_date)
            .bind(draft.check_out_date)
            .bind(&draft.room_type)
            .bind(draft.room_count)
            .bind(quote.total_price)
            .bind(OrderStatus::Pending)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok(order)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn delete_pending(&self, id: Uuid, user_id: Uuid) -> Result<Option<Order>, AppError> {
        let mut tx = self.pool.begin().await?;

        // O filtro por status garante que um pedido aprovado no meio do caminho não some
        let sql = format!(
            "DELETE FROM orders WHERE id = $1 AND user_id = $2 AND status = $3 RETURNING {}",
            ORDER_COLUMNS
        );
        let deleted = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(OrderStatus::Pending)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = deleted else {
            return Ok(None);
        };

        if let Some(mut listing) = Self::lock_listing(&mut tx, order.hotel_id).await? {
            if release_on_listing(&mut listing, &order) {
                Self::save_rooms(&mut tx, &listing).await?;
            }
        }

        tx.commit().await?;
        Ok(Some(order))
    }
}
