// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserPayload {
    #[validate(custom(function = "validate_not_blank", message = "Vui lòng nhập tên người dùng."))]
    pub username: String,
    #[validate(email(message = "Email không hợp lệ."))]
    pub email: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[validate(email(message = "Email không hợp lệ."))]
    pub email: String,
    #[validate(length(min = 1, message = "Vui lòng nhập mật khẩu."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
