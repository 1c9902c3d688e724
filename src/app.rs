// src/app.rs
// DOCUMENTATION: HTTP application assembly
// PURPOSE: CORS policy, JSON body parsing and route registration shared by main and tests

use crate::config::{AppConfig, CORS_ALLOWED_ORIGINS};
use crate::errors::AppError;
use crate::handlers;
use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::{error, web, HttpRequest};

/// Cross-origin policy: fixed origin allow-list with credentials
pub fn cors() -> Cors {
    CORS_ALLOWED_ORIGINS
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec![
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_any_header()
        .expose_headers(vec![header::CONTENT_DISPOSITION])
        .supports_credentials()
        .max_age(3600)
}

/// JSON body parsing applied to every handler
/// Malformed bodies are answered with the standard error envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected JSON body: {}", err);
        error::Error::from(AppError::InvalidJson(err.to_string()))
    })
}

async fn not_found(req: HttpRequest) -> Result<&'static str, AppError> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig, config: &AppConfig) {
    cfg.app_data(json_config())
        .configure(handlers::health_config)
        .configure(|cfg| handlers::uploads_config(cfg, &config.uploads_dir))
        .configure(handlers::groups_config)
        .default_service(web::to(not_found));
}
