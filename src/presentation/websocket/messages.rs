//! WebSocket Message Types
//!
//! JSON text frames tagged with an `event` name and a `data` payload.

use serde::{Deserialize, Serialize};

use crate::application::dto::response::{GroupResponse, MessageResponse};

/// Events a client may send after connecting.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Send a message to the conversation's other party.
    SendMessage(SendMessagePayload),
    /// Transient typing indicator for the connected conversation.
    UserIsTyping,
}

/// Payload of `SendMessage`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub recipient_username: String,
    pub content: String,
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Group membership changed; sent to everyone in the group.
    UpdatedGroup(GroupResponse),
    /// The conversation history, sent to the connecting caller only.
    ReceiveMessageThread(Vec<MessageResponse>),
    /// A message was persisted; sent to everyone in the group.
    NewMessage(MessageResponse),
    /// Out-of-band signal to a recipient's other live connections.
    #[serde(rename_all = "camelCase")]
    NewMessageReceived { username: String, known_as: String },
    /// Someone in the group is typing.
    UserIsTyping { username: String },
    /// An operation failed; sent to the caller only.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn client_send_message_deserializes() {
        let frame = r#"{"event":"SendMessage","data":{"recipientUsername":"bob","content":"hi"}}"#;
        let event: ClientEvent = serde_json::from_str(frame).unwrap();
        match event {
            ClientEvent::SendMessage(payload) => {
                assert_eq!(payload.recipient_username, "bob");
                assert_eq!(payload.content, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn client_typing_deserializes_without_payload() {
        let event: ClientEvent = serde_json::from_str(r#"{"event":"UserIsTyping"}"#).unwrap();
        assert!(matches!(event, ClientEvent::UserIsTyping));
    }

    #[test]
    fn new_message_received_is_camel_case() {
        let event = ServerEvent::NewMessageReceived {
            username: "alice".into(),
            known_as: "Alice".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "NewMessageReceived");
        assert_eq!(json["data"]["username"], "alice");
        assert_eq!(json["data"]["knownAs"], "Alice");
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"Nope"}"#).is_err());
    }
}
