//! Hub Session Context
//!
//! The per-connection context passed explicitly to every hub callback. The
//! caller identity comes from the validated access token and the conversation
//! peer from the connection metadata supplied at upgrade time; both are
//! canonical lowercase by the time a session exists.

/// Context for one live hub connection.
#[derive(Debug, Clone)]
pub struct HubSession {
    /// Unique id of this transport session
    pub connection_id: String,
    /// Authenticated caller (canonical lowercase)
    pub username: String,
    /// The conversation's other party (canonical lowercase)
    pub peer: String,
}

impl HubSession {
    pub fn new(
        connection_id: impl Into<String>,
        username: impl Into<String>,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            username: username.into(),
            peer: peer.into(),
        }
    }
}
