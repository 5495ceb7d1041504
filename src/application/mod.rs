//! Application Layer
//!
//! Business logic services coordinating domain operations.

pub mod services;

pub use services::{CleanupHandle, MessageService, PostError, DEFAULT_HISTORY_LIMIT};
