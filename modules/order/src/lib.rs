pub mod config;
pub mod health;
pub mod listeners;
pub mod order;
pub mod order_service;
pub mod replicas;
