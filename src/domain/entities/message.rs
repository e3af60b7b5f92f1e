//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::PagedSlice;

use super::user::User;

/// Filter modes for a user's message list.
///
/// Determines which predicate is applied before pagination:
/// - `Inbox`: messages received and not deleted by the recipient
/// - `Outbox`: messages sent and not deleted by the sender
/// - `Unread`: received, not deleted, and never read (the default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MessageContainer {
    Inbox,
    Outbox,
    #[default]
    Unread,
}

impl MessageContainer {
    /// Parse a query-string value; anything unrecognized falls back to Unread.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "inbox" => Self::Inbox,
            "outbox" => Self::Outbox,
            _ => Self::Unread,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Outbox => "Outbox",
            Self::Unread => "Unread",
        }
    }
}

impl std::fmt::Display for MessageContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A private message between two users.
///
/// Maps to the `messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - sender_id / recipient_id: BIGINT NOT NULL REFERENCES users(id)
/// - sender_username / recipient_username: VARCHAR(32) NOT NULL
/// - content: TEXT NOT NULL
/// - read_at: TIMESTAMPTZ NULL -- set at most once
/// - sent_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - sender_deleted / recipient_deleted: BOOLEAN NOT NULL DEFAULT FALSE
///
/// A message is purged from the store only once both deletion flags are set;
/// until then a "deleted" side simply no longer sees it in its own views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID (primary key)
    pub id: i64,

    pub sender_id: i64,
    pub sender_username: String,

    pub recipient_id: i64,
    pub recipient_username: String,

    /// Message body
    pub content: String,

    /// When the recipient read the message (None while unread)
    pub read_at: Option<DateTime<Utc>>,

    /// When the message was sent
    pub sent_at: DateTime<Utc>,

    /// Sender has removed the message from their own view
    pub sender_deleted: bool,

    /// Recipient has removed the message from their own view
    pub recipient_deleted: bool,
}

impl Message {
    /// Build a fresh outgoing message: unread, visible to both sides.
    pub fn new(id: i64, sender: &User, recipient: &User, content: &str) -> Self {
        Self {
            id,
            sender_id: sender.id,
            sender_username: sender.username.clone(),
            recipient_id: recipient.id,
            recipient_username: recipient.username.clone(),
            content: content.to_string(),
            read_at: None,
            sent_at: Utc::now(),
            sender_deleted: false,
            recipient_deleted: false,
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Both sides have deleted the message; it may be purged from the store.
    pub fn is_fully_deleted(&self) -> bool {
        self.sender_deleted && self.recipient_deleted
    }
}

/// Repository trait for message data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a message by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError>;

    /// Persist a new message. Returns the stored row.
    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// Persist updated per-side deletion flags.
    async fn update_deleted_flags(&self, message: &Message) -> Result<(), AppError>;

    /// Remove a message permanently.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Fetch the conversation thread between two users, newest first,
    /// excluding messages the requesting side has deleted for itself.
    ///
    /// As a side effect every unread message addressed to
    /// `current_username` is stamped read within the same transaction, so
    /// repeated calls are idempotent.
    async fn thread(
        &self,
        current_username: &str,
        peer_username: &str,
    ) -> Result<Vec<Message>, AppError>;

    /// Page through a user's messages, newest first, filtered by container.
    /// The slice's total count reflects the filtered set, not the whole table.
    async fn find_for_user(
        &self,
        username: &str,
        container: MessageContainer,
        page_number: i32,
        page_size: i32,
    ) -> Result<PagedSlice<Message>, AppError>;
}
