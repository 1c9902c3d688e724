// src/handlers/health.rs
// DOCUMENTATION: Liveness and health check handlers
// PURPOSE: Simple endpoints to verify service status

use crate::config::db::check_connection;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::MySqlPool;

pub const GREETING: &str = "🚀 Server is up and running!";

/// Body of GET /health
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// "connected" or "unavailable"
    pub database: &'static str,
}

/// GET /
pub async fn root() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(GREETING)
}

/// GET /health
/// Reports database reachability through the shared pool
pub async fn health_check(pool: web::Data<MySqlPool>) -> impl Responder {
    let (status, database) = match check_connection(pool.get_ref()).await {
        Ok(()) => ("ok", "connected"),
        Err(e) => {
            log::warn!("Health check could not reach the database: {}", e);
            ("degraded", "unavailable")
        }
    };

    HttpResponse::Ok().json(HealthStatus {
        status,
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health_check));
}
