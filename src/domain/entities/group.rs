//! Conversation group and connection entities with their repository trait.
//!
//! A group is the persistent container for all live connections belonging to
//! one two-party conversation, keyed by the canonical pair name. Groups are
//! created lazily on first join and retained when they empty out; the name is
//! the conversation's identity across reconnects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// One live transport session joined to a conversation group.
///
/// Maps to the `connections` table. A connection belongs to at most one group
/// at a time; a user with several open sessions holds one connection per
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub connection_id: String,
    pub username: String,
}

impl Connection {
    pub fn new(connection_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            username: username.into(),
        }
    }
}

/// A named conversation group and its current live connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub connections: Vec<Connection>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connections: Vec::new(),
        }
    }

    /// Whether any live connection in the group belongs to `username`.
    pub fn has_user(&self, username: &str) -> bool {
        self.connections.iter().any(|c| c.username == username)
    }

    pub fn has_connection(&self, connection_id: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.connection_id == connection_id)
    }
}

/// Repository trait for conversation group persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Load a group (with its connections) by canonical name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, AppError>;

    /// Load the group currently containing the given connection id.
    async fn find_for_connection(&self, connection_id: &str) -> Result<Option<Group>, AppError>;

    /// Return the group with this name, creating an empty one if absent.
    async fn get_or_create(&self, name: &str) -> Result<Group, AppError>;

    /// Append a connection record to the named group and return the updated
    /// membership. The group must already exist; a failure to persist is an
    /// error, never a silent no-op.
    async fn join_connection(&self, name: &str, connection: &Connection)
        -> Result<Group, AppError>;

    /// Remove a connection from whichever group holds it and return the
    /// group's remaining membership. Reports `NotFound` if no group contains
    /// the connection; callers decide whether that is an error.
    async fn leave_connection(&self, connection_id: &str) -> Result<Group, AppError>;
}
