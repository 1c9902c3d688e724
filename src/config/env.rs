// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load HTTP server configuration from .env files

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

/// Origins allowed to make credentialed cross-origin requests
pub const CORS_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:5174",
    "http://localhost:5173",
    "https://backend-ben.vercel.app",
];

/// Read an environment variable, treating an empty value as unset
pub fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes server settings in one struct
/// Database settings live in `DbSettings`, loaded separately
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind address (default "0.0.0.0")
    pub server_address: String,

    /// Server listen port (default 5000)
    pub server_port: u16,

    /// Environment name: development, staging, production
    pub environment: String,

    /// Log level used when RUST_LOG is not set
    pub log_level: String,

    /// Directory served under /uploads
    pub uploads_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(env_lookup)
    }

    /// Build configuration from an arbitrary name -> value lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        AppConfig {
            server_address: lookup("SERVER_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),

            server_port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            environment: lookup("NODE_ENV").unwrap_or_else(|| "development".to_string()),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
        }
    }

    /// Socket address string for HttpServer::bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_address, self.server_port)
    }
}
