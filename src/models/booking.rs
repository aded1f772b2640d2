// src/models/booking.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::booking;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum OrderStatus {
    Pending,  // "Đang chờ duyệt"
    Approved,
    Cancelled,
}

impl OrderStatus {
    /// Texto exibido ao hóspede (o app original gravava o rótulo direto no documento).
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Đang chờ duyệt",
            OrderStatus::Approved => "Đã duyệt",
            OrderStatus::Cancelled => "Đã hủy",
        }
    }
}

// --- Pedido (reserva) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub hotel_name: String,
    pub user_id: Uuid,
    pub hotel_owner_id: Option<Uuid>,
    pub user_name: String,
    pub phone_number: String,
    pub email: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub room_type: String,
    pub room_count: i32,
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Noites exibidas na tela de gerenciamento, mesma regra do cálculo da reserva.
    pub fn nights(&self) -> i64 {
        booking::nights(self.check_in_date, self.check_out_date)
    }
}

// Tudo o que o serviço sabe antes de abrir a transação.
// Nome do hotel, dono e preço total são lidos da linha travada no banco.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub hotel_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub phone_number: String,
    pub email: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub room_type: String,
    pub room_count: i32,
}

// Resposta das listagens: o pedido + noites já calculadas
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub nights: i64,
    pub status_label: &'static str,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let nights = order.nights();
        let status_label = order.status.label();
        Self { order, nights, status_label }
    }
}

// Resultado do calculador de reservas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuote {
    pub nights: i64,
    pub unit_price: i64,
    pub room_count: i32,
    pub total_price: i64,
}
