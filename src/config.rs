// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{ListingRepository, OrderRepository, UserRepository},
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        chat::{classifier::KeywordClassifier, model::GeminiClient, ChatService},
        order_service::OrderService,
    },
};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

// Configurações lidas do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub bind_addr: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout: Duration,
    pub chat_model_retries: u32,
    pub chat_session_ttl: Duration,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ({}): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            bcrypt_cost: optional("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: optional("GEMINI_MODEL", DEFAULT_GEMINI_MODEL.to_string())?,
            gemini_base_url: optional("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL.to_string())?,
            gemini_timeout: Duration::from_secs(optional("GEMINI_TIMEOUT_SECS", 30)?),
            chat_model_retries: optional("CHAT_MODEL_RETRIES", 1)?,
            chat_session_ttl: Duration::from_secs(optional("CHAT_SESSION_TTL_SECS", 3600)?),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub chat_service: ChatService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let listing_repo = Arc::new(ListingRepository::new(db_pool.clone()));
        let order_repo = Arc::new(OrderRepository::new(db_pool.clone()));

        let gemini = GeminiClient::new(
            settings.gemini_base_url.clone(),
            settings.gemini_model.clone(),
            settings.gemini_api_key.clone(),
            settings.gemini_timeout,
        )?;

        let auth_service = AuthService::new(
            user_repo,
            settings.jwt_secret.clone(),
            settings.bcrypt_cost,
        );
        let catalog_service = CatalogService::new(listing_repo.clone());
        let order_service = OrderService::new(order_repo, listing_repo.clone());
        let chat_service = ChatService::new(
            listing_repo,
            Arc::new(gemini),
            Arc::new(KeywordClassifier::default()),
            settings.chat_model_retries,
        )
        .with_session_ttl(settings.chat_session_ttl);

        Ok(Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            catalog_service,
            order_service,
            chat_service,
        })
    }
}
