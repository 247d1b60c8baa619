pub mod cart;
pub mod cart_service;
pub mod config;
pub mod health;
pub mod listeners;
pub mod replicas;
