//! WebSocket Board
//!
//! Real-time message fan-out: one hub task owning the live session set,
//! two pumps per connection, and the frame codec in between.

pub mod connection;
pub mod frames;
pub mod handler;
pub mod hub;
pub mod session;

pub use connection::{FrameSink, FrameStream, WsFrameSink, WsFrameStream};
pub use frames::{BoardFrame, PostFrame};
pub use handler::ws_handler;
pub use hub::{Hub, SessionHandle};
