//! Presence Tracking
//!
//! In-memory registry of which connections each user currently holds open.
//! Created once at process start and injected into the hub; state is lost on
//! restart and rebuilt as users reconnect.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

/// Maps a username to the set of its open connection ids.
///
/// Invariant: an entry exists if and only if its set is non-empty. `remove`
/// drops the whole entry when the last connection closes, so queries never
/// observe a present-but-empty user. Mutations take the lock for the full
/// read-modify-write; queries return a point-in-time snapshot.
pub struct PresenceTracker {
    online: Mutex<HashMap<String, HashSet<String>>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            online: Mutex::new(HashMap::new()),
        }
    }

    /// Register a connection under a user, creating the entry if absent.
    pub fn add(&self, username: &str, connection_id: &str) {
        let mut online = self.online.lock();
        online
            .entry(username.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    /// Drop a connection; the user's entry disappears with its last one.
    pub fn remove(&self, username: &str, connection_id: &str) {
        let mut online = self.online.lock();
        if let Some(connections) = online.get_mut(username) {
            connections.remove(connection_id);
            if connections.is_empty() {
                online.remove(username);
            }
        }
    }

    /// Snapshot of the user's open connection ids, or None when offline.
    pub fn connections_for(&self, username: &str) -> Option<Vec<String>> {
        let online = self.online.lock();
        online
            .get(username)
            .map(|connections| connections.iter().cloned().collect())
    }

    /// Whether the user holds at least one open connection.
    pub fn is_online(&self, username: &str) -> bool {
        self.online.lock().contains_key(username)
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn add_and_query() {
        let tracker = PresenceTracker::new();
        assert!(tracker.connections_for("alice").is_none());

        tracker.add("alice", "c1");
        tracker.add("alice", "c2");

        let mut connections = tracker.connections_for("alice").unwrap();
        connections.sort();
        assert_eq!(connections, vec!["c1", "c2"]);
    }

    #[test]
    fn entry_disappears_with_last_connection() {
        let tracker = PresenceTracker::new();
        tracker.add("alice", "c1");
        tracker.add("alice", "c2");

        tracker.remove("alice", "c1");
        assert_eq!(tracker.connections_for("alice").unwrap().len(), 1);

        tracker.remove("alice", "c2");
        assert!(tracker.connections_for("alice").is_none());
        assert!(!tracker.is_online("alice"));
    }

    #[test]
    fn removing_unknown_connection_is_harmless() {
        let tracker = PresenceTracker::new();
        tracker.remove("ghost", "c1");
        assert!(tracker.connections_for("ghost").is_none());

        tracker.add("alice", "c1");
        tracker.remove("alice", "other");
        assert!(tracker.is_online("alice"));
    }

    #[test]
    fn users_are_tracked_independently() {
        let tracker = PresenceTracker::new();
        tracker.add("alice", "c1");
        tracker.add("bob", "c2");

        tracker.remove("alice", "c1");
        assert!(!tracker.is_online("alice"));
        assert!(tracker.is_online("bob"));
    }

    #[test]
    fn concurrent_churn_never_leaves_an_empty_entry() {
        let tracker = Arc::new(PresenceTracker::new());
        let mut handles = Vec::new();

        for user in 0..4 {
            let username = format!("user{user}");
            for conn in 0..8 {
                let tracker = Arc::clone(&tracker);
                let username = username.clone();
                handles.push(std::thread::spawn(move || {
                    let connection_id = format!("conn-{conn}");
                    for _ in 0..200 {
                        tracker.add(&username, &connection_id);
                        tracker.remove(&username, &connection_id);
                    }
                }));
            }
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // Every add was paired with a remove, so no entry may survive.
        for user in 0..4 {
            let username = format!("user{user}");
            assert!(tracker.connections_for(&username).is_none());
            assert!(!tracker.is_online(&username));
        }
    }
}
