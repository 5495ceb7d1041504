//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error returned by the message store adapter.
///
/// Callers treat this as opaque: a failed store call is logged and the
/// operation abandoned, never retried inline.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store error: {0}")]
    Internal(String),
}

/// Error on the duplex connection underneath a session.
///
/// Fatal to that session only; it triggers unregister + close and is never
/// propagated to other sessions or the hub control loop.
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<axum::Error> for TransportError {
    fn from(err: axum::Error) -> Self {
        Self(err.to_string())
    }
}

/// Application error type for the HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::Store(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    10000,
                    "Internal server error".into(),
                )
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}
