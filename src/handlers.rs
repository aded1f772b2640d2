pub mod auth;
pub mod catalog;
pub mod chat;
pub mod orders;
