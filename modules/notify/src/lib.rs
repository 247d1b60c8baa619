pub mod config;
pub mod health;
pub mod listeners;
pub mod notify_queue;
