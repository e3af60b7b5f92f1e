//! # Presentation Layer
//!
//! HTTP routes, middleware and the WebSocket messaging hub.

pub mod http;
pub mod middleware;
pub mod websocket;
