//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes row-level change notifications
//! for the fixtures a client follows, and answers snapshot requests.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
