// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export configuration components

pub mod db;
pub mod env;
pub mod tls;

pub use db::{init_db_pool, spawn_connection_check, DbSettings};
pub use env::{AppConfig, CORS_ALLOWED_ORIGINS};
