//! Response DTOs
//!
//! Data structures for API response bodies and hub pushes. The wire format is
//! camelCase JSON; snowflake ids travel as strings.

use serde::Serialize;

use crate::domain::{Connection, Group, Message};

/// Message response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_username: String,
    pub recipient_username: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    pub sent_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_username: message.sender_username,
            recipient_username: message.recipient_username,
            content: message.content,
            read_at: message.read_at.map(|t| t.to_rfc3339()),
            sent_at: message.sent_at.to_rfc3339(),
        }
    }
}

/// One live connection within a conversation group
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub connection_id: String,
    pub username: String,
}

impl From<Connection> for ConnectionResponse {
    fn from(connection: Connection) -> Self {
        Self {
            connection_id: connection.connection_id,
            username: connection.username,
        }
    }
}

/// Conversation group response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub name: String,
    pub connections: Vec<ConnectionResponse>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            name: group.name,
            connections: group
                .connections
                .into_iter()
                .map(ConnectionResponse::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn message_response_uses_camel_case_and_string_ids() {
        let message = Message {
            id: 42,
            sender_id: 1,
            sender_username: "alice".into(),
            recipient_id: 2,
            recipient_username: "bob".into(),
            content: "hi".into(),
            read_at: None,
            sent_at: Utc::now(),
            sender_deleted: false,
            recipient_deleted: false,
        };
        let json = serde_json::to_value(MessageResponse::from(message)).unwrap();
        assert_eq!(json["id"], "42");
        assert_eq!(json["senderUsername"], "alice");
        assert_eq!(json["recipientUsername"], "bob");
        assert!(json.get("readAt").is_none());
        assert!(json.get("sentAt").is_some());
    }
}
