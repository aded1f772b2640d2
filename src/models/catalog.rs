// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::booking::BookingError;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_type", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum ListingType {
    Hotel,
    Homestay,
}

// --- Quarto (embutido na hospedagem) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_type: String,
    #[serde(alias = "pricePerNight")]
    pub price: i64,     // VND por noite
    pub available: i32, // Nunca negativo
}

impl Room {
    /// Retira `count` quartos do estoque. Falha sem alterar nada se não houver saldo.
    pub fn reserve(&mut self, count: i32) -> Result<(), BookingError> {
        if count > self.available {
            return Err(BookingError::InsufficientInventory {
                available: self.available,
            });
        }
        self.available -= count;
        Ok(())
    }

    pub fn release(&mut self, count: i32) {
        self.available = self.available.saturating_add(count.max(0));
    }
}

// --- Hospedagem (hotel ou homestay) ---
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub city: String,
    pub hotel_name: String,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub kind: ListingType,
    pub amenities: Vec<String>,
    pub rating: Option<f64>,
    pub main_image: Option<String>,
    pub sub_images: Vec<String>,
    #[serde(rename = "userId")]
    pub owner_id: Option<Uuid>,
    pub rooms: Vec<Room>,
}

// Palavras no nome que denunciam um homestay mesmo quando o tipo diz "hotel"
const HOMESTAY_NAME_HINTS: [&str; 4] = ["homestay", "nhà nghỉ", "guesthouse", "hostel"];

impl Listing {
    pub fn room(&self, room_type: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.room_type == room_type)
    }

    pub fn room_mut(&mut self, room_type: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.room_type == room_type)
    }

    pub fn is_homestay(&self) -> bool {
        if self.kind == ListingType::Homestay {
            return true;
        }
        let name = self.hotel_name.to_lowercase();
        HOMESTAY_NAME_HINTS.iter().any(|hint| name.contains(hint))
    }

    /// Menor preço por noite entre os quartos, se houver algum.
    pub fn lowest_price(&self) -> Option<i64> {
        self.rooms.iter().map(|r| r.price).filter(|p| *p > 0).min()
    }
}
