// src/common/error.rs

use std::sync::LazyLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::{I18nStore, DEFAULT_LANG},
    middleware::i18n::Locale,
    models::booking::OrderStatus,
    services::booking::BookingError,
};

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Hospedagem não encontrada")]
    ListingNotFound,

    #[error("Tipo de quarto não encontrado: {0}")]
    RoomNotFound(String),

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Pedido com status {0:?} não pode ser cancelado")]
    OrderNotCancellable(OrderStatus),

    #[error("Mensagem vazia")]
    EmptyMessage,

    #[error("Assistente ocupado")]
    AssistantBusy,

    #[error("Erro do modelo de IA: {0}")]
    ModelError(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Erro já traduzido, pronto para virar resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::Booking(_)
            | AppError::EmptyMessage => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::OrderNotCancellable(_)
            | AppError::AssistantBusy => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ListingNotFound
            | AppError::RoomNotFound(_)
            | AppError::OrderNotFound => StatusCode::NOT_FOUND,
            AppError::ModelError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();
        let lang = locale.0.as_str();

        let (key, args): (&str, Vec<(&str, String)>) = match &self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                return ApiError {
                    status,
                    error: i18n.translate(lang, "validation"),
                    details: Some(Value::Object(details)),
                };
            }
            AppError::EmailAlreadyExists => ("email_exists", vec![]),
            AppError::InvalidCredentials => ("invalid_credentials", vec![]),
            AppError::InvalidToken => ("invalid_token", vec![]),
            AppError::ListingNotFound => ("listing_not_found", vec![]),
            AppError::RoomNotFound(room) => ("room_not_found", vec![("room", room.clone())]),
            AppError::OrderNotFound => ("order_not_found", vec![]),
            AppError::Booking(BookingError::InsufficientInventory { available }) => {
                ("insufficient_inventory", vec![("available", available.to_string())])
            }
            AppError::Booking(BookingError::InvalidDateRange) => ("invalid_date_range", vec![]),
            AppError::Booking(BookingError::InvalidRoomCount) => ("invalid_room_count", vec![]),
            AppError::Booking(BookingError::PriceOverflow) => ("price_overflow", vec![]),
            AppError::Booking(BookingError::RoomUnpriced) => ("room_unpriced", vec![]),
            AppError::OrderNotCancellable(_) => ("order_not_cancellable", vec![]),
            AppError::EmptyMessage => ("empty_message", vec![]),
            AppError::AssistantBusy => ("assistant_busy", vec![]),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ("internal", vec![])
            }
        };

        ApiError {
            status,
            error: i18n.translate_with(lang, key, &args),
            details: None,
        }
    }
}

static DEFAULT_I18N: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

// Usado onde não há `Locale` disponível (middleware de autenticação)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let locale = Locale(DEFAULT_LANG.to_string());
        self.to_api_error(&locale, &DEFAULT_I18N).into_response()
    }
}
