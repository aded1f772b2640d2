// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{AuthResponse, Claims, User},
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserStore>,
    jwt_secret: String,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserStore>, jwt_secret: String, bcrypt_cost: u32) -> Self {
        Self {
            user_repo,
            jwt_secret,
            bcrypt_cost,
        }
    }

    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AppError> {
        let email = email.trim();

        // Hashing fora do runtime async
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let new_user = self
            .user_repo
            .create_user(username.trim(), email, &hashed_password)
            .await?;

        tracing::info!(user_id = %new_user.id, "👤 Novo usuário registrado");

        Ok(AuthResponse {
            token: self.create_token(new_user.id)?,
            username: new_user.username,
        })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(AuthResponse {
            token: self.create_token(user.id)?,
            username: user.username,
        })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
