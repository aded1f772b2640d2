//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é aceitável aqui: sem configuração a aplicação não deve iniciar.
    let settings = Settings::from_env().expect("Falha ao ler a configuração do ambiente.");

    let app_state = AppState::new(&settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Catálogo e cotação são públicos
    let catalog_routes = Router::new()
        .route("/cities", get(handlers::catalog::list_cities))
        .route("/listings", get(handlers::catalog::list_listings))
        .route("/listings/{listing_id}", get(handlers::catalog::get_listing))
        .route("/bookings/quote", post(handlers::orders::quote_booking));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_my_orders),
        )
        .route("/stream", get(handlers::orders::stream_my_orders))
        .route("/{order_id}", delete(handlers::orders::cancel_order))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let chat_routes = Router::new()
        .route(
            "/messages",
            post(handlers::chat::send_message).get(handlers::chat::get_transcript),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api", catalog_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/chat", chat_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", settings.bind_addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
