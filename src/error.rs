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
    #[error("No active training session")]
    SessionNotFound,

    #[error("Training log entry not found or already resolved: {0}")]
    EntryNotFound(String),

    #[error("Cannot go back from the first week")]
    InvalidWeekRegression,

    #[error("All training days of the current week are already completed")]
    WeekAlreadyComplete,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Transport error text used when the Bot API rate-limits us.
    pub const TRANSPORT_RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Whether the error is part of normal conversational flow.
    ///
    /// Recoverable errors are answered with a short message to the user.
    /// Everything else (storage, internal) may propagate to the top level.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::SessionNotFound
                | AppError::EntryNotFound(_)
                | AppError::InvalidWeekRegression
                | AppError::WeekAlreadyComplete
                | AppError::BadRequest(_)
                | AppError::Transport(_)
        )
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
            AppError::SessionNotFound => (StatusCode::NOT_FOUND, "session_not_found", None),
            AppError::EntryNotFound(id) => {
                (StatusCode::NOT_FOUND, "entry_not_found", Some(id.clone()))
            }
            AppError::InvalidWeekRegression => {
                (StatusCode::CONFLICT, "invalid_week_regression", None)
            }
            AppError::WeekAlreadyComplete => (StatusCode::CONFLICT, "week_complete", None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Transport(msg) => {
                (StatusCode::BAD_GATEWAY, "transport_error", Some(msg.clone()))
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
