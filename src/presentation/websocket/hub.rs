//! Messaging Hub
//!
//! The protocol state machine behind the WebSocket endpoint. One handler per
//! inbound event — connect, send, typing, disconnect — each taking the
//! explicit session context. Per connection the lifecycle is
//! Connecting -> Joined -> Disconnected.
//!
//! Persistence always commits before the matching broadcast goes out: a group
//! member never observes a message the store might still reject.

use std::sync::Arc;

use chrono::Utc;

use crate::application::dto::response::{GroupResponse, MessageResponse};
use crate::domain::services::conversation;
use crate::domain::{Connection, GroupRepository, Message, MessageRepository, UserRepository};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

use super::gateway::{GroupNotifier, PresenceBroadcaster};
use super::messages::ServerEvent;
use super::presence::PresenceTracker;
use super::session::HubSession;

/// The messaging hub, generic over its stores so tests can swap them out.
pub struct MessageHub<M, G, U>
where
    M: MessageRepository,
    G: GroupRepository,
    U: UserRepository,
{
    messages: Arc<M>,
    groups: Arc<G>,
    users: Arc<U>,
    presence: Arc<PresenceTracker>,
    notifier: Arc<dyn GroupNotifier>,
    presence_hub: Arc<dyn PresenceBroadcaster>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<M, G, U> MessageHub<M, G, U>
where
    M: MessageRepository,
    G: GroupRepository,
    U: UserRepository,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        messages: Arc<M>,
        groups: Arc<G>,
        users: Arc<U>,
        presence: Arc<PresenceTracker>,
        notifier: Arc<dyn GroupNotifier>,
        presence_hub: Arc<dyn PresenceBroadcaster>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            messages,
            groups,
            users,
            presence,
            notifier,
            presence_hub,
            id_generator,
        }
    }

    /// Connect transition: join the conversation group, record presence,
    /// announce the membership change and push the thread to the caller.
    ///
    /// A failure to persist the join is fatal to the connect attempt; nothing
    /// is registered and the error surfaces to the caller.
    pub async fn connect(&self, session: &HubSession) -> Result<(), AppError> {
        let group_name = conversation::group_name(&session.username, &session.peer);

        self.notifier.join_group(&group_name, &session.connection_id);

        self.groups.get_or_create(&group_name).await?;
        let connection = Connection::new(&*session.connection_id, &*session.username);
        let group = self.groups.join_connection(&group_name, &connection).await?;

        self.presence.add(&session.username, &session.connection_id);

        self.notifier
            .send_to_group(&group_name, ServerEvent::UpdatedGroup(GroupResponse::from(group)));

        let mut thread = self
            .messages
            .thread(&session.username, &session.peer)
            .await?;
        // Stored newest-first; displayed oldest-first.
        thread.reverse();
        self.notifier.send_to_connection(
            &session.connection_id,
            ServerEvent::ReceiveMessageThread(
                thread.into_iter().map(MessageResponse::from).collect(),
            ),
        );

        tracing::info!(
            username = %session.username,
            connection_id = %session.connection_id,
            group = %group_name,
            "Connected to conversation"
        );

        Ok(())
    }

    /// SendMessage transition: validate, persist, then broadcast.
    ///
    /// If the recipient holds a connection in the shared group the message is
    /// stamped read immediately; otherwise their other live connections get a
    /// best-effort out-of-band notification.
    pub async fn send_message(
        &self,
        session: &HubSession,
        recipient_username: &str,
        content: &str,
    ) -> Result<(), AppError> {
        let recipient_username = recipient_username.to_lowercase();

        if session.username.eq_ignore_ascii_case(&recipient_username) {
            return Err(AppError::Validation(
                "You cannot send messages to yourself".into(),
            ));
        }
        if content.trim().is_empty() {
            return Err(AppError::Validation("Message content is required".into()));
        }

        let sender = self
            .users
            .find_by_username(&session.username)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "sender {} missing from directory",
                    session.username
                ))
            })?;
        let recipient = self
            .users
            .find_by_username(&recipient_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {recipient_username} not found")))?;

        let mut message = Message::new(self.id_generator.generate(), &sender, &recipient, content);

        let group_name = conversation::group_name(&sender.username, &recipient.username);
        let group = self.groups.find_by_name(&group_name).await?;

        if group.is_some_and(|g| g.has_user(&recipient.username)) {
            // Recipient is co-present in this conversation: read on arrival.
            message.read_at = Some(Utc::now());
        } else if let Some(connections) = self.presence.connections_for(&recipient.username) {
            // Best effort; a lost notification must not fail the send.
            metrics::NOTIFICATIONS_RELAYED_TOTAL.inc_by(connections.len() as u64);
            self.presence_hub.relay_to_connections(
                &connections,
                ServerEvent::NewMessageReceived {
                    username: sender.username.clone(),
                    known_as: sender.known_as.clone(),
                },
            );
        }

        let persisted = self.messages.create(&message).await?;
        metrics::MESSAGES_SENT_TOTAL.inc();

        self.notifier.send_to_group(
            &group_name,
            ServerEvent::NewMessage(MessageResponse::from(persisted)),
        );

        Ok(())
    }

    /// UserIsTyping transition: stateless fan-out to the conversation group.
    pub fn user_typing(&self, session: &HubSession) {
        let group_name = conversation::group_name(&session.username, &session.peer);
        self.notifier.send_to_group(
            &group_name,
            ServerEvent::UserIsTyping {
                username: session.username.clone(),
            },
        );
    }

    /// Disconnect transition: drop presence, leave the persisted group and
    /// announce the new membership to whoever remains.
    ///
    /// A connection with no persisted group is already-cleaned-up state, not
    /// an error.
    pub async fn disconnect(&self, session: &HubSession) -> Result<(), AppError> {
        self.presence.remove(&session.username, &session.connection_id);

        match self.groups.leave_connection(&session.connection_id).await {
            Ok(group) => {
                self.notifier.leave_group(&group.name, &session.connection_id);
                let group_name = group.name.clone();
                self.notifier
                    .send_to_group(&group_name, ServerEvent::UpdatedGroup(GroupResponse::from(group)));
                tracing::info!(
                    username = %session.username,
                    connection_id = %session.connection_id,
                    group = %group_name,
                    "Disconnected from conversation"
                );
                Ok(())
            }
            Err(AppError::NotFound(_)) => {
                tracing::debug!(
                    connection_id = %session.connection_id,
                    "Disconnect for connection with no group; already cleaned up"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
