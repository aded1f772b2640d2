// src/db/memory.rs
//
// Store em memória para os testes dos serviços. Um único Mutex faz o papel da
// transação: travar, validar, baixar estoque e gravar acontecem juntos.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        order_repo::{release_on_listing, reserve_on_listing},
        ListingStore, OrderStore, UserStore,
    },
    models::{
        auth::User,
        booking::{Order, OrderDraft, OrderStatus},
        catalog::Listing,
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    listings: Vec<Listing>,
    orders: Vec<Order>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        let store = Self::new();
        store.tables.lock().unwrap().listings = listings;
        store
    }

    pub fn listing(&self, id: Uuid) -> Option<Listing> {
        self.tables.lock().unwrap().listings.iter().find(|l| l.id == id).cloned()
    }

    pub fn remove_listing(&self, id: Uuid) {
        self.tables.lock().unwrap().listings.retain(|l| l.id != id);
    }

    /// Simula o dono do hotel aprovando o pedido.
    pub fn set_status(&self, order_id: Uuid, status: OrderStatus) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(order) = tables.orders.iter_mut().find(|o| o.id == order_id) {
            order.status = status;
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn list_by_city(&self, city: Option<&str>) -> Result<Vec<Listing>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .listings
            .iter()
            .filter(|l| city.is_none_or(|c| l.city == c))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(self.listing(id))
    }

    async fn list_cities(&self) -> Result<Vec<String>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut cities: Vec<String> = Vec::new();
        for listing in &tables.listings {
            if !cities.contains(&listing.city) {
                cities.push(listing.city.clone());
            }
        }
        Ok(cities)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place_order(&self, draft: OrderDraft) -> Result<Order, AppError> {
        let mut tables = self.tables.lock().unwrap();

        let listing = tables
            .listings
            .iter_mut()
            .find(|l| l.id == draft.hotel_id)
            .ok_or(AppError::ListingNotFound)?;

        // Trabalha numa cópia: só grava se tudo passar
        let mut locked = listing.clone();
        let quote = reserve_on_listing(&mut locked, &draft)?;
        *listing = locked.clone();

        let order = Order {
            id: Uuid::new_v4(),
            hotel_id: locked.id,
            hotel_name: locked.hotel_name.clone(),
            user_id: draft.user_id,
            hotel_owner_id: locked.owner_id,
            user_name: draft.user_name.trim().to_string(),
            phone_number: draft.phone_number.trim().to_string(),
            email: draft.email,
            check_in_date: draft.check_in_date,
            check_out_date: draft.check_out_date,
            room_type: draft.room_type,
            room_count: draft.room_count,
            total_price: quote.total_price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.orders.iter().filter(|o| o.user_id == user_id).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn delete_pending(&self, id: Uuid, user_id: Uuid) -> Result<Option<Order>, AppError> {
        let mut tables = self.tables.lock().unwrap();

        let Some(pos) = tables.orders.iter().position(|o| {
            o.id == id && o.user_id == user_id && o.status == OrderStatus::Pending
        }) else {
            return Ok(None);
        };
        let order = tables.orders.remove(pos);

        if let Some(listing) = tables.listings.iter_mut().find(|l| l.id == order.hotel_id) {
            release_on_listing(listing, &order);
        }
        Ok(Some(order))
    }
}
