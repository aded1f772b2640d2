pub mod auth;
pub mod booking;
pub mod catalog;
pub mod chat;
