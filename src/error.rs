// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::client::ClientError;
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

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Backend error: {0}")]
    Backend(#[from] ClientError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
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
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                Some(errors.to_string()),
            ),
            AppError::Backend(err) => backend_status(err),
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

/// Map a backend failure onto our own status.
///
/// Client errors from the backend (bad credentials, RLS denials, constraint
/// violations) are forwarded with their message; everything else is a
/// gateway failure.
fn backend_status(err: &ClientError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        ClientError::Api { status, .. } if matches!(status, 401 | 403) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::FORBIDDEN),
            "backend_denied",
            Some(err.message()),
        ),
        ClientError::Api { status, .. } if (400..500).contains(status) => {
            (StatusCode::BAD_REQUEST, "backend_rejected", Some(err.message()))
        }
        ClientError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "unauthorized", None),
        other => {
            tracing::error!(error = %other, "Backend error");
            (StatusCode::BAD_GATEWAY, "backend_error", None)
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
