//! Custom Extractors
//!
//! Axum extractors for request parsing.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::shared::error::AppError;

/// Identity established by the fronting authentication layer.
///
/// The board never verifies credentials itself: an upstream auth proxy
/// authenticates the caller and forwards the result in the `x-user-id` and
/// `x-username` headers. Requests missing either header are rejected.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing or invalid x-user-id header".into()))?;

        let username = parts
            .headers
            .get("x-username")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AppError::Unauthorized("Missing x-username header".into()))?;

        Ok(Identity { user_id, username })
    }
}
