// src/services/booking.rs
//
// Calculadora de reservas: noites, preço total e validação de estoque/datas.
// Funções puras, sem acesso a banco.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{booking::BookingQuote, catalog::Room};

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Apenas {available} quarto(s) disponível(is)")]
    InsufficientInventory { available: i32 },

    #[error("Check-out deve ser depois do check-in")]
    InvalidDateRange,

    #[error("Quantidade de quartos inválida")]
    InvalidRoomCount,

    #[error("Preço total fora do limite")]
    PriceOverflow,

    #[error("Quarto sem preço válido")]
    RoomUnpriced,
}

/// Noites entre as duas datas, arredondado para o dia mais próximo.
/// Mesmo dia conta como uma noite.
pub fn nights(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    let millis = (check_out - check_in).num_milliseconds().abs() as f64;
    let days = (millis / MILLIS_PER_DAY).round() as i64;
    days.max(1)
}

pub fn total_price(unit_price: i64, room_count: i32, nights: i64) -> Result<i64, BookingError> {
    unit_price
        .checked_mul(i64::from(room_count))
        .and_then(|v| v.checked_mul(nights))
        .ok_or(BookingError::PriceOverflow)
}

// Estoque primeiro, depois datas (a ordem das mensagens que o app mostra)
pub fn validate(
    room: &Room,
    room_count: i32,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<(), BookingError> {
    if room_count < 1 {
        return Err(BookingError::InvalidRoomCount);
    }
    // Cadastro é feito fora daqui; sem preço positivo não há pedido possível
    if room.price <= 0 {
        return Err(BookingError::RoomUnpriced);
    }
    if room_count > room.available {
        return Err(BookingError::InsufficientInventory {
            available: room.available,
        });
    }
    if check_in >= check_out {
        return Err(BookingError::InvalidDateRange);
    }
    Ok(())
}

pub fn quote(
    room: &Room,
    room_count: i32,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<BookingQuote, BookingError> {
    validate(room, room_count, check_in, check_out)?;

    let nights = nights(check_in, check_out);
    let total_price = total_price(room.price, room_count, nights)?;

    Ok(BookingQuote {
        nights,
        unit_price: room.price,
        room_count,
        total_price,
    })
}
