//! # Domain Entities
//!
//! The board has a single persistent entity: the short-lived `Message`.
//! Its storage contract is the `MessageStore` trait, implemented in the
//! infrastructure layer (dependency inversion).

mod message;

pub use message::{Message, MessageStatus, MessageStore, NewMessage};
