//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::{DomainError, ErrorKind};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown caller: {0}")]
    UnknownCaller(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// The domain error inside, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Domain error category, if this is a domain error
    pub fn kind(&self) -> Option<ErrorKind> {
        self.domain().map(DomainError::kind)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 401 Unauthorized
            AppError::UnknownCaller(id) => {
                (StatusCode::UNAUTHORIZED, "unknown_caller", Some(id.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::Validation { field, .. } => (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    Some(field.to_string()),
                ),
                DomainError::NotFound { id, .. } => {
                    (StatusCode::NOT_FOUND, "not_found", Some(id.to_string()))
                }
                DomainError::EventUnavailable(id) => {
                    (StatusCode::CONFLICT, "event_unavailable", Some(id.to_string()))
                }
                DomainError::CapacityExceeded { .. }
                | DomainError::CapacityBelowBooked { .. }
                | DomainError::ReleaseExceedsBooked { .. } => {
                    (StatusCode::CONFLICT, "capacity_exceeded", None)
                }
                DomainError::SeatConflict { seats } => {
                    (StatusCode::CONFLICT, "seat_conflict", Some(seats.join(",")))
                }
                DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", None),
                DomainError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "unauthenticated", None)
                }
            },

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
