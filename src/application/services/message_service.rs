//! Message Service
//!
//! Handles the REST message operations: create, list (paged), thread view and
//! per-side deletion. Real-time delivery is the hub's job; a message created
//! here is picked up by the recipient the next time a thread or inbox loads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dto::request::MessageParams;
use crate::domain::{Message, MessageRepository, UserRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::PagedSlice;
use crate::shared::snowflake::SnowflakeGenerator;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Create and persist a message from `sender_username`.
    async fn create_message(
        &self,
        sender_username: &str,
        recipient_username: &str,
        content: &str,
    ) -> Result<Message, MessageError>;

    /// Page through the caller's messages filtered by container.
    async fn messages_for_user(
        &self,
        username: &str,
        params: MessageParams,
    ) -> Result<PagedSlice<Message>, MessageError>;

    /// The conversation thread with `peer_username`, oldest first. Marks
    /// unread incoming messages as read.
    async fn thread(
        &self,
        current_username: &str,
        peer_username: &str,
    ) -> Result<Vec<Message>, MessageError>;

    /// Delete a message from the caller's side; purge it once both sides
    /// have deleted it.
    async fn delete_message(&self, id: i64, username: &str) -> Result<(), MessageError>;
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("You cannot send messages to yourself")]
    SelfMessage,

    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("Message not found")]
    NotFound,

    #[error("You are not allowed to modify this message")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MessageError {
    fn internal(e: AppError) -> Self {
        MessageError::Internal(e.to_string())
    }
}

/// MessageService implementation
pub struct MessageServiceImpl<M, U>
where
    M: MessageRepository,
    U: UserRepository,
{
    messages: Arc<M>,
    users: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<M, U> MessageServiceImpl<M, U>
where
    M: MessageRepository,
    U: UserRepository,
{
    pub fn new(messages: Arc<M>, users: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            messages,
            users,
            id_generator,
        }
    }
}

#[async_trait]
impl<M, U> MessageService for MessageServiceImpl<M, U>
where
    M: MessageRepository + 'static,
    U: UserRepository + 'static,
{
    async fn create_message(
        &self,
        sender_username: &str,
        recipient_username: &str,
        content: &str,
    ) -> Result<Message, MessageError> {
        let recipient_username = recipient_username.to_lowercase();

        if sender_username.eq_ignore_ascii_case(&recipient_username) {
            return Err(MessageError::SelfMessage);
        }

        let sender = self
            .users
            .find_by_username(sender_username)
            .await
            .map_err(MessageError::internal)?
            .ok_or_else(|| {
                MessageError::Internal(format!("sender {sender_username} missing from directory"))
            })?;

        let recipient = self
            .users
            .find_by_username(&recipient_username)
            .await
            .map_err(MessageError::internal)?
            .ok_or(MessageError::RecipientNotFound)?;

        let message = Message::new(self.id_generator.generate(), &sender, &recipient, content);

        self.messages
            .create(&message)
            .await
            .map_err(MessageError::internal)
    }

    async fn messages_for_user(
        &self,
        username: &str,
        params: MessageParams,
    ) -> Result<PagedSlice<Message>, MessageError> {
        let params = params.normalized();
        self.messages
            .find_for_user(
                username,
                params.container(),
                params.page_number,
                params.page_size,
            )
            .await
            .map_err(MessageError::internal)
    }

    async fn thread(
        &self,
        current_username: &str,
        peer_username: &str,
    ) -> Result<Vec<Message>, MessageError> {
        let mut messages = self
            .messages
            .thread(current_username, &peer_username.to_lowercase())
            .await
            .map_err(MessageError::internal)?;

        // Stored newest-first; displayed oldest-first.
        messages.reverse();
        Ok(messages)
    }

    async fn delete_message(&self, id: i64, username: &str) -> Result<(), MessageError> {
        let mut message = self
            .messages
            .find_by_id(id)
            .await
            .map_err(MessageError::internal)?
            .ok_or(MessageError::NotFound)?;

        if message.sender_username != username && message.recipient_username != username {
            return Err(MessageError::Forbidden);
        }

        if message.sender_username == username {
            message.sender_deleted = true;
        }
        if message.recipient_username == username {
            message.recipient_deleted = true;
        }

        if message.is_fully_deleted() {
            self.messages
                .delete(message.id)
                .await
                .map_err(MessageError::internal)
        } else {
            self.messages
                .update_deleted_flags(&message)
                .await
                .map_err(MessageError::internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::{MockMessageRepository, MockUserRepository, User};

    use super::*;

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.into(),
            known_as: username.to_uppercase(),
            created_at: Utc::now(),
        }
    }

    fn message(id: i64, sender: &str, recipient: &str) -> Message {
        Message::new(id, &user(1, sender), &user(2, recipient), "hello")
    }

    fn service(
        messages: MockMessageRepository,
        users: MockUserRepository,
    ) -> MessageServiceImpl<MockMessageRepository, MockUserRepository> {
        MessageServiceImpl::new(
            Arc::new(messages),
            Arc::new(users),
            Arc::new(SnowflakeGenerator::new(1)),
        )
    }

    #[tokio::test]
    async fn self_message_is_rejected_case_insensitively() {
        let mut messages = MockMessageRepository::new();
        messages.expect_create().times(0);
        let users = MockUserRepository::new();

        let result = service(messages, users)
            .create_message("alice", "ALICE", "hi me")
            .await;

        assert!(matches!(result, Err(MessageError::SelfMessage)));
    }

    #[tokio::test]
    async fn unknown_recipient_persists_nothing() {
        let mut messages = MockMessageRepository::new();
        messages.expect_create().times(0);

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(|_| Ok(Some(user(1, "alice"))));
        users
            .expect_find_by_username()
            .withf(|name| name == "ghost")
            .returning(|_| Ok(None));

        let result = service(messages, users)
            .create_message("alice", "ghost", "anyone there?")
            .await;

        assert!(matches!(result, Err(MessageError::RecipientNotFound)));
    }

    #[tokio::test]
    async fn created_message_starts_unread_and_undeleted() {
        let mut messages = MockMessageRepository::new();
        messages
            .expect_create()
            .withf(|m| {
                m.sender_username == "alice"
                    && m.recipient_username == "bob"
                    && m.read_at.is_none()
                    && !m.sender_deleted
                    && !m.recipient_deleted
            })
            .times(1)
            .returning(|m| Ok(m.clone()));

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(|_| Ok(Some(user(1, "alice"))));
        users
            .expect_find_by_username()
            .withf(|name| name == "bob")
            .returning(|_| Ok(Some(user(2, "bob"))));

        let created = service(messages, users)
            .create_message("alice", "Bob", "hi")
            .await
            .unwrap();
        assert_eq!(created.recipient_username, "bob");
    }

    #[tokio::test]
    async fn deleting_from_one_side_only_flags_it() {
        let mut messages = MockMessageRepository::new();
        messages
            .expect_find_by_id()
            .returning(|id| Ok(Some(message(id, "alice", "bob"))));
        messages
            .expect_update_deleted_flags()
            .withf(|m| m.sender_deleted && !m.recipient_deleted)
            .times(1)
            .returning(|_| Ok(()));
        messages.expect_delete().times(0);

        let users = MockUserRepository::new();
        service(messages, users)
            .delete_message(7, "alice")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_from_both_sides_purges_the_row() {
        let mut messages = MockMessageRepository::new();
        messages.expect_find_by_id().returning(|id| {
            let mut m = message(id, "alice", "bob");
            m.recipient_deleted = true;
            Ok(Some(m))
        });
        messages.expect_update_deleted_flags().times(0);
        messages
            .expect_delete()
            .withf(|id| *id == 7)
            .times(1)
            .returning(|_| Ok(()));

        let users = MockUserRepository::new();
        service(messages, users)
            .delete_message(7, "alice")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn strangers_cannot_delete_a_message() {
        let mut messages = MockMessageRepository::new();
        messages
            .expect_find_by_id()
            .returning(|id| Ok(Some(message(id, "alice", "bob"))));
        messages.expect_update_deleted_flags().times(0);
        messages.expect_delete().times(0);

        let users = MockUserRepository::new();
        let result = service(messages, users).delete_message(7, "mallory").await;
        assert!(matches!(result, Err(MessageError::Forbidden)));
    }

    #[tokio::test]
    async fn thread_is_returned_oldest_first() {
        let mut messages = MockMessageRepository::new();
        messages.expect_thread().returning(|_, _| {
            Ok(vec![message(3, "bob", "alice"), message(1, "alice", "bob")])
        });

        let users = MockUserRepository::new();
        let thread = service(messages, users).thread("alice", "bob").await.unwrap();
        let ids: Vec<i64> = thread.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
