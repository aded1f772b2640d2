// src/models/chat.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

// Cartão de sugestão renderizado pelo app; `listing_id` permite navegar até a reserva
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCard {
    pub name: String,
    pub price_per_night: Option<Value>, // O modelo devolve número ou texto
    pub rating: Option<f64>,
    pub area: Option<String>,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    pub listing_id: Option<Uuid>,
}

// Uma entrada do histórico. Mensagens de texto têm `text`, sugestões têm `cards`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<SuggestionCard>>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(ChatRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(ChatRole::Assistant, text)
    }

    pub fn suggestions(cards: Vec<SuggestionCard>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::Assistant,
            text: None,
            cards: Some(cards),
            created_at: Utc::now(),
        }
    }

    fn text(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: Some(text.into()),
            cards: None,
            created_at: Utc::now(),
        }
    }
}
