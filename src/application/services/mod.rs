//! Application Services
//!
//! ## Available Services
//!
//! - **MessageService**: message lifecycle — validated creation with TTL,
//!   recent-history reads, and the periodic expiry sweep.

pub mod message_service;

pub use message_service::{CleanupHandle, MessageService, PostError, DEFAULT_HISTORY_LIMIT};
