//! Presentation Layer
//!
//! HTTP routes and the WebSocket broadcast hub.

pub mod http;
pub mod websocket;
