pub mod config;
pub mod health;
pub mod listeners;
pub mod replicas;
pub mod wishlist_service;
