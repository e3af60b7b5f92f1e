//! # Domain Layer
//!
//! Core business logic of the messaging server, independent of any framework
//! or infrastructure concern.
//!
//! - **entities**: User, Message, conversation Group and Connection
//! - **services**: pure domain functions (conversation group naming)
//!
//! Repository traits define the data access contracts implemented in the
//! infrastructure layer.

pub mod entities;
pub mod services;

pub use entities::*;
