//! Message Repository Implementation
//!
//! PostgreSQL implementation of message operations: thread retrieval with the
//! mark-as-read side effect, container-filtered pagination, and per-side
//! deletion flags.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageContainer, MessageRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::PagedSlice;

const MESSAGE_COLUMNS: &str = "id, sender_id, sender_username, recipient_id, recipient_username, \
     content, read_at, sent_at, sender_deleted, recipient_deleted";

/// PostgreSQL message repository implementation.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
/// Maps to the messages table schema defined in the migration.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender_id: i64,
    sender_username: String,
    recipient_id: i64,
    recipient_username: String,
    content: String,
    read_at: Option<DateTime<Utc>>,
    sent_at: DateTime<Utc>,
    sender_deleted: bool,
    recipient_deleted: bool,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            sender_id: self.sender_id,
            sender_username: self.sender_username,
            recipient_id: self.recipient_id,
            recipient_username: self.recipient_username,
            content: self.content,
            read_at: self.read_at,
            sent_at: self.sent_at,
            sender_deleted: self.sender_deleted,
            recipient_deleted: self.recipient_deleted,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            INSERT INTO messages (id, sender_id, sender_username, recipient_id,
                                  recipient_username, content, read_at, sent_at,
                                  sender_deleted, recipient_deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message.id)
        .bind(message.sender_id)
        .bind(&message.sender_username)
        .bind(message.recipient_id)
        .bind(&message.recipient_username)
        .bind(&message.content)
        .bind(message.read_at)
        .bind(message.sent_at)
        .bind(message.sender_deleted)
        .bind(message.recipient_deleted)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn update_deleted_flags(&self, message: &Message) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE messages SET sender_deleted = $2, recipient_deleted = $3 WHERE id = $1",
        )
        .bind(message.id)
        .bind(message.sender_deleted)
        .bind(message.recipient_deleted)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Message {} not found", message.id)));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Message {} not found", id)));
        }

        Ok(())
    }

    /// Fetch the two-party thread and stamp unread incoming messages as read.
    ///
    /// Both statements run inside one transaction so a reader either observes
    /// the stamped thread fully committed or not at all. The update touches
    /// zero rows on a second call, which keeps the operation idempotent.
    async fn thread(
        &self,
        current_username: &str,
        peer_username: &str,
    ) -> Result<Vec<Message>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE recipient_username = $1
              AND sender_username = $2
              AND recipient_deleted = FALSE
              AND read_at IS NULL
            "#,
        )
        .bind(current_username)
        .bind(peer_username)
        .execute(&mut *tx)
        .await?;

        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (recipient_username = $1 AND sender_username = $2 AND recipient_deleted = FALSE)
               OR (sender_username = $1 AND recipient_username = $2 AND sender_deleted = FALSE)
            ORDER BY sent_at DESC, id DESC
            "#
        ))
        .bind(current_username)
        .bind(peer_username)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn find_for_user(
        &self,
        username: &str,
        container: MessageContainer,
        page_number: i32,
        page_size: i32,
    ) -> Result<PagedSlice<Message>, AppError> {
        let filter = match container {
            MessageContainer::Inbox => {
                "recipient_username = $1 AND recipient_deleted = FALSE"
            }
            MessageContainer::Outbox => "sender_username = $1 AND sender_deleted = FALSE",
            MessageContainer::Unread => {
                "recipient_username = $1 AND recipient_deleted = FALSE AND read_at IS NULL"
            }
        };

        let total_count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM messages WHERE {filter}"
        ))
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        let offset = (page_number as i64 - 1) * page_size as i64;
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE {filter}
            ORDER BY sent_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(username)
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let messages: Vec<Message> = rows.into_iter().map(|r| r.into_message()).collect();
        Ok(PagedSlice::new(messages, total_count, page_number, page_size))
    }
}
