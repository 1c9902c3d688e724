// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database pool, and start HTTP server

mod app;
mod config;
mod errors;
mod handlers;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{AppConfig, DbSettings, CORS_ALLOWED_ORIGINS};
use dotenv::dotenv;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = AppConfig::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting {}...", env!("CARGO_PKG_NAME"));

    // 4. Database settings; missing values are logged, not fatal
    let db_settings = DbSettings::from_env();
    if let Err(e) = db_settings.validate() {
        log::error!("{}", e);
    }

    // 5. Initialize database connection pool and check it in the background
    let pool = config::init_db_pool(&db_settings);
    config::spawn_connection_check(pool.clone(), &db_settings);

    // 6. Start HTTP server
    let server_addr = config.bind_address();
    let config_clone = config.clone();

    let server = HttpServer::new(move || {
        App::new()
            // Application state (database pool)
            .app_data(web::Data::new(pool.clone()))
            // Middleware
            .wrap(app::cors())
            .wrap(Logger::default())
            // Routes
            .configure(|cfg| app::configure(cfg, &config_clone))
    })
    .bind(&server_addr)?;

    log::info!("Server running on port {}", config.server_port);
    log::info!("Environment: {}", config.environment);
    log::info!("CORS allowed origins: {}", CORS_ALLOWED_ORIGINS.join(", "));

    server.run().await
}
