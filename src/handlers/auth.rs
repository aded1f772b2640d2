// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{LoginUserPayload, RegisterUserPayload, User},
};

// POST /api/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .register_user(&payload.username, &payload.email, &payload.password)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// GET /api/users/me
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
