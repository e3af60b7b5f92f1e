//! WebSocket messaging hub.
//!
//! - **messages**: the wire protocol (client and server events)
//! - **session**: per-connection context handed to every hub callback
//! - **presence**: in-memory map of a user's open connections
//! - **gateway**: live connection registry and event fan-out
//! - **hub**: the connect/send/typing/disconnect state machine
//! - **handler**: axum upgrade handler and socket loop

pub mod gateway;
pub mod handler;
pub mod hub;
pub mod messages;
pub mod presence;
pub mod session;

pub use handler::ws_handler;
