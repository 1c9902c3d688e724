// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for configuration and request failures

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Required database variable that was not provided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingVar {
    /// Neither DB_HOST nor DB_SOCKET_PATH
    HostOrSocket,
    User,
    Database,
}

impl MissingVar {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingVar::HostOrSocket => "DB_HOST or DB_SOCKET_PATH",
            MissingVar::User => "DB_USER",
            MissingVar::Database => "DB_NAME",
        }
    }
}

impl fmt::Display for MissingVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup configuration problems
/// Logged by main; none of them stop the process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing DB env vars: {}", join_vars(.0))]
    MissingVars(Vec<MissingVar>),
}

fn join_vars(vars: &[MissingVar]) -> String {
    vars.iter()
        .map(MissingVar::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and JSON error body
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Route group '{0}' has no handler for this request")]
    RouteGroupUnavailable(&'static str),

    /// Query failure surfaced by a mounted route group; passed through, never retried
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Lets route group handlers attached through `RouteGroup::with_routes` use `?` on
/// pool queries and get the standard error envelope
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

/// Convert AppError to HTTP response
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_code = match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidJson(_) => "INVALID_JSON",
            AppError::RouteGroupUnavailable(_) => "ROUTE_GROUP_UNAVAILABLE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            AppError::RouteGroupUnavailable(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vars_message() {
        let err = ConfigError::MissingVars(vec![MissingVar::User]);
        assert_eq!(err.to_string(), "Missing DB env vars: DB_USER");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidJson("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RouteGroupUnavailable("auth").status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            AppError::from(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
