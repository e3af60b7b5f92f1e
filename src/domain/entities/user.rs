//! User directory entry and repository trait.
//!
//! Maps to the `users` table. Account creation, authentication and profile
//! editing are owned by the account service; the messaging core only reads
//! the directory to resolve senders and recipients.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A registered user as the messaging core sees it.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE (canonical lowercase)
/// - known_as: VARCHAR(64) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Unique username, stored lowercase
    pub username: String,

    /// Display name shown to other users
    pub known_as: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Repository trait for the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by canonical (lowercase) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}
