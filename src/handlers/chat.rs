// src/handlers/chat.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::chat::ChatMessage,
};

#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub text: String,
    // Cidade ativa na tela; sem ela o assistente olha todas
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessagesResponse {
    pub messages: Vec<ChatMessage>,
}

// POST /api/chat/messages
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .chat_service
        .send_message(user.id, payload.city.as_deref(), &payload.text)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ChatMessagesResponse { messages }))
}

// GET /api/chat/messages
pub async fn get_transcript(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<ChatMessagesResponse> {
    Json(ChatMessagesResponse {
        messages: app_state.chat_service.transcript(user.id),
    })
}
