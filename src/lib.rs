//! # Pulse Board
//!
//! A real-time ephemeral message board:
//! - WebSocket fan-out of posted messages to every connected viewer
//! - PostgreSQL persistence with a fixed message time-to-live
//! - Background sweep hard-deleting expired messages
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: the `Message` entity and the store trait
//! - **Application Layer**: the message lifecycle service and expiry sweep
//! - **Infrastructure Layer**: sqlx PostgreSQL store implementation
//! - **Presentation Layer**: HTTP routes and the WebSocket broadcast hub
//!
//! ## Module Structure
//!
//! ```text
//! pulse_board/
//! +-- config/         Configuration management
//! +-- domain/         Message entity and store trait
//! +-- application/    Message lifecycle service
//! +-- infrastructure/ Database pool and store implementation
//! +-- presentation/   HTTP routes and WebSocket hub
//! +-- shared/         Common error types
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business types
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
