//! Repository Implementations
//!
//! PostgreSQL implementation of the `MessageStore` trait defined in the
//! domain layer.

pub mod message_repository;

pub use message_repository::PgMessageStore;
