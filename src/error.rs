// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// An arithmetic precondition was violated (zero distance, negative duration).
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    /// The import source was unreachable or returned a malformed entry.
    #[error("Import source error: {0}")]
    ImportSource(String),

    /// A record with the same key already exists in the store.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Error message used when Smashrun rejects the access token.
    pub const SMASHRUN_TOKEN_ERROR: &'static str = "Smashrun token invalid or expired";
    /// Error message used when Smashrun rate limits us.
    pub const SMASHRUN_RATE_LIMIT: &'static str = "Smashrun rate limit exceeded";

    /// Whether this error means the Smashrun token must be refreshed.
    pub fn is_smashrun_token_error(&self) -> bool {
        match self {
            AppError::ImportSource(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("token") || msg.contains("unauthorized")
            }
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::InvalidMetric(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_metric", Some(msg.clone()))
            }
            AppError::ImportSource(msg) => {
                (StatusCode::BAD_GATEWAY, "import_source_error", Some(msg.clone()))
            }
            AppError::DuplicateKey(msg) => {
                (StatusCode::CONFLICT, "duplicate_key", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
