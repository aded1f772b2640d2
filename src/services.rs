pub mod auth;
pub mod booking;
pub mod catalog_service;
pub mod chat;
pub mod order_service;
