//! WebSocket Gateway
//!
//! Live routing table for open connections: which sender channel belongs to
//! which connection id, and which connection ids are currently joined to each
//! conversation group. Persistent group membership lives in the group store;
//! this registry only covers connections alive in this process.

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::messages::ServerEvent;

/// Fan-out interface the hub uses to reach a conversation group's live
/// connections.
#[cfg_attr(test, mockall::automock)]
pub trait GroupNotifier: Send + Sync {
    /// Add a connection to a group's live routing entry.
    fn join_group(&self, group_name: &str, connection_id: &str);

    /// Remove a connection from a group's live routing entry.
    fn leave_group(&self, group_name: &str, connection_id: &str);

    /// Push an event to every live connection in the group.
    fn send_to_group(&self, group_name: &str, event: ServerEvent);

    /// Push an event to one connection.
    fn send_to_connection(&self, connection_id: &str, event: ServerEvent);
}

/// Out-of-band channel for presence-style notifications to a user's other
/// live connections (the ones not joined to the conversation at hand).
/// Delivery is best effort; failures are swallowed.
#[cfg_attr(test, mockall::automock)]
pub trait PresenceBroadcaster: Send + Sync {
    fn relay_to_connections(&self, connection_ids: &[String], event: ServerEvent);
}

/// WebSocket gateway managing all live connections in this process.
pub struct Gateway {
    /// Outgoing channel per connection id
    connections: DashMap<String, mpsc::UnboundedSender<ServerEvent>>,
    /// Group name to joined connection ids
    groups: DashMap<String, Vec<String>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Register a new connection's outgoing channel.
    pub fn register_connection(
        &self,
        connection_id: &str,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.connections.insert(connection_id.to_string(), sender);
        tracing::debug!(connection_id, "Connection registered");
    }

    /// Drop a connection from the registry and from any group entry.
    pub fn unregister_connection(&self, connection_id: &str) {
        self.connections.remove(connection_id);
        for mut entry in self.groups.iter_mut() {
            entry.value_mut().retain(|id| id != connection_id);
        }
        tracing::debug!(connection_id, "Connection unregistered");
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupNotifier for Gateway {
    fn join_group(&self, group_name: &str, connection_id: &str) {
        let mut members = self.groups.entry(group_name.to_string()).or_default();
        if !members.iter().any(|id| id == connection_id) {
            members.push(connection_id.to_string());
        }
    }

    fn leave_group(&self, group_name: &str, connection_id: &str) {
        if let Some(mut members) = self.groups.get_mut(group_name) {
            members.retain(|id| id != connection_id);
        }
    }

    fn send_to_group(&self, group_name: &str, event: ServerEvent) {
        let Some(members) = self.groups.get(group_name) else {
            return;
        };
        for connection_id in members.iter() {
            if let Some(sender) = self.connections.get(connection_id) {
                // A closed receiver means the socket is tearing down; the
                // disconnect transition will clean it up.
                let _ = sender.send(event.clone());
            }
        }
    }

    fn send_to_connection(&self, connection_id: &str, event: ServerEvent) {
        if let Some(sender) = self.connections.get(connection_id) {
            let _ = sender.send(event);
        }
    }
}

impl PresenceBroadcaster for Gateway {
    fn relay_to_connections(&self, connection_ids: &[String], event: ServerEvent) {
        for connection_id in connection_ids {
            if let Some(sender) = self.connections.get(connection_id) {
                let _ = sender.send(event.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing(username: &str) -> ServerEvent {
        ServerEvent::UserIsTyping {
            username: username.into(),
        }
    }

    #[tokio::test]
    async fn group_members_receive_group_events() {
        let gateway = Gateway::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        gateway.register_connection("a", tx_a);
        gateway.register_connection("b", tx_b);
        gateway.join_group("alice-bob", "a");
        gateway.join_group("alice-bob", "b");

        gateway.send_to_group("alice-bob", typing("alice"));

        assert!(matches!(rx_a.try_recv(), Ok(ServerEvent::UserIsTyping { .. })));
        assert!(matches!(rx_b.try_recv(), Ok(ServerEvent::UserIsTyping { .. })));
    }

    #[tokio::test]
    async fn leaving_a_group_stops_delivery() {
        let gateway = Gateway::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        gateway.register_connection("a", tx);
        gateway.join_group("alice-bob", "a");
        gateway.leave_group("alice-bob", "a");

        gateway.send_to_group("alice-bob", typing("bob"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn joining_twice_delivers_once() {
        let gateway = Gateway::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        gateway.register_connection("a", tx);
        gateway.join_group("alice-bob", "a");
        gateway.join_group("alice-bob", "a");

        gateway.send_to_group("alice-bob", typing("bob"));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_removes_connection_from_groups() {
        let gateway = Gateway::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        gateway.register_connection("a", tx);
        gateway.join_group("alice-bob", "a");
        gateway.unregister_connection("a");

        gateway.send_to_group("alice-bob", typing("bob"));
        assert!(rx.try_recv().is_err());
        assert_eq!(gateway.connection_count(), 0);
    }

    #[tokio::test]
    async fn relay_targets_only_listed_connections() {
        let gateway = Gateway::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        gateway.register_connection("a", tx_a);
        gateway.register_connection("b", tx_b);

        gateway.relay_to_connections(
            &["a".to_string()],
            ServerEvent::NewMessageReceived {
                username: "bob".into(),
                known_as: "Bob".into(),
            },
        );

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn sending_to_a_dead_connection_is_swallowed() {
        let gateway = Gateway::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        gateway.register_connection("a", tx);
        gateway.join_group("alice-bob", "a");
        gateway.send_to_group("alice-bob", typing("bob"));
        gateway.send_to_connection("a", typing("bob"));
    }
}
