//! Route Configuration
//!
//! Configures all HTTP routes for the board.

use axum::{routing::get, Router};

use super::handlers;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // WebSocket board endpoint
        .route("/ws", get(ws_handler))
        // Message history
        .route("/messages", get(handlers::messages::get_messages))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}
