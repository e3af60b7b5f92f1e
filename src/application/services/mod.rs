//! Application Services
//!
//! Business logic behind the HTTP handlers.

mod message_service;

pub use message_service::{MessageError, MessageService, MessageServiceImpl};
