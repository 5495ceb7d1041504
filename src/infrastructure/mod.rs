//! Infrastructure Layer
//!
//! PostgreSQL connection pooling and the store adapter implementation.

pub mod database;
pub mod repositories;
