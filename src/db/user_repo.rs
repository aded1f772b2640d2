// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::UserStore, models::auth::User};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    // Busca um usuário pelo seu e-mail
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;

        Ok(user)
    }
}
