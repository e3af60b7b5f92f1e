//! # Domain Entities
//!
//! The main business objects of the messaging core, each mapping to its
//! database table:
//!
//! - **User**: directory entry for a registered account (profile management
//!   itself lives in the account service)
//! - **Message**: a private message between two users, with per-side deletion
//!   flags and an at-most-once read timestamp
//! - **Group / Connection**: a named conversation group and the live
//!   connections currently joined to it
//!
//! Each entity has an associated repository trait defining its data access
//! operations, implemented in the infrastructure layer.

mod group;
mod message;
mod user;

pub use group::{Connection, Group, GroupRepository};
pub use message::{Message, MessageContainer, MessageRepository};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use group::MockGroupRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use user::MockUserRepository;
