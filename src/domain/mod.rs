//! # Domain Layer
//!
//! Core business types of the message board, independent of any framework
//! or infrastructure concern.
//!
//! - **entities**: the `Message` entity and the `MessageStore` trait that
//!   defines the persistence contract implemented in the infrastructure
//!   layer.

pub mod entities;

pub use entities::*;
