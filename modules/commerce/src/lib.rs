pub mod catalog;
pub mod catalog_service;
pub mod config;
pub mod health;
pub mod listeners;
pub mod replicas;
