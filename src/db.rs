// src/db.rs
//
// Contratos de persistência. Os serviços recebem `Arc<dyn ...Store>` montados
// no `AppState`, então os testes trocam o Postgres por um store em memória.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        booking::{Order, OrderDraft},
        catalog::Listing,
    },
};

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod listing_repo;
pub use listing_repo::ListingRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;

#[cfg(test)]
pub mod memory;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError>;
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// `None` devolve as hospedagens de todas as cidades.
    async fn list_by_city(&self, city: Option<&str>) -> Result<Vec<Listing>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError>;
    async fn list_cities(&self) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Numa única unidade atômica: trava a hospedagem, revalida e baixa o
    /// estoque do quarto e grava o pedido como pendente.
    async fn place_order(&self, draft: OrderDraft) -> Result<Order, AppError>;

    /// Pedidos do usuário na ordem de inserção.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    /// Remove o pedido se ainda estiver pendente e devolve os quartos ao estoque.
    /// `None` quando nada foi removido.
    async fn delete_pending(&self, id: Uuid, user_id: Uuid) -> Result<Option<Order>, AppError>;
}
