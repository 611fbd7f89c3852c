//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
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
            AppError::MissingHeader(header) => (
                StatusCode::BAD_REQUEST,
                "missing_header",
                Some(header.clone()),
            ),

            // 403 Forbidden
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),

            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InvalidAmount(msg) => {
                        (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                    }
                    DomainError::InsufficientBalance { .. } => (
                        StatusCode::BAD_REQUEST,
                        "insufficient_balance",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::UserNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "user_not_found",
                        Some(id.to_string()),
                    ),
                    DomainError::AdminNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "admin_not_found",
                        Some(id.to_string()),
                    ),
                    DomainError::InvitationNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "invitation_not_found",
                        Some(id.to_string()),
                    ),
                    DomainError::TemplateNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "template_not_found",
                        Some(id.to_string()),
                    ),
                    DomainError::PackageNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "package_not_found",
                        Some(id.to_string()),
                    ),
                    DomainError::PermissionDenied(msg) => {
                        (StatusCode::FORBIDDEN, "permission_denied", Some(msg.clone()))
                    }
                    DomainError::AlreadyPublished => {
                        (StatusCode::CONFLICT, "already_published", None)
                    }
                    DomainError::RequestNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "topup_not_found",
                        Some(id.to_string()),
                    ),
                    DomainError::AlreadyProcessed => {
                        (StatusCode::CONFLICT, "already_processed", None)
                    }
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
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
