pub mod config;
pub mod health;
pub mod user;
pub mod user_service;
