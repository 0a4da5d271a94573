//! Connection pool, all active connections indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active WebSocket connections.
///
/// Backed by sharded maps so lookups for one user never contend with
/// registrations for another.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID -> list of connection handles (one per device).
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID -> connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection from the pool. The user's entry is dropped
    /// entirely when their last connection goes away.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
        }
        // The emptiness check must happen under the entry lock; a plain
        // check-then-remove could delete an entry a concurrent add just
        // repopulated.
        self.by_user
            .remove_if(&handle.user_id, |_, connections| connections.is_empty());
        Some(handle)
    }

    /// Gets all connections for a user, oldest first.
    pub fn user_connections(&self, user_id: &Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns whether the user has at least one live connection.
    pub fn is_online(&self, user_id: &Uuid) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Returns the total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns the number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use litquest_entity::user::UserRole;
    use tokio::sync::mpsc;

    use super::*;

    fn handle_for(user_id: Uuid) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Arc::new(ConnectionHandle::new(user_id, UserRole::Student, tx)),
            rx,
        )
    }

    #[test]
    fn test_indexes_multiple_devices_per_user() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();

        let (phone, _rx1) = handle_for(user);
        let (laptop, _rx2) = handle_for(user);
        pool.add(phone.clone());
        pool.add(laptop.clone());

        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);
        assert_eq!(pool.user_connections(&user).len(), 2);
        assert!(pool.is_online(&user));
    }

    #[test]
    fn test_last_disconnect_clears_user_entry() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();

        let (a, _rx1) = handle_for(user);
        let (b, _rx2) = handle_for(user);
        pool.add(a.clone());
        pool.add(b.clone());

        pool.remove(&a.id);
        assert!(pool.is_online(&user));

        pool.remove(&b.id);
        assert!(!pool.is_online(&user));
        assert_eq!(pool.user_count(), 0);
        assert_eq!(pool.connection_count(), 0);
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let pool = ConnectionPool::new();
        assert!(pool.remove(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_concurrent_remove_and_add_keep_user_online() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();

        for _ in 0..2000 {
            let (old_conn, _rx1) = handle_for(user);
            pool.add(old_conn.clone());
            let (new_conn, _rx2) = handle_for(user);

            std::thread::scope(|s| {
                s.spawn(|| {
                    pool.remove(&old_conn.id);
                });
                s.spawn(|| {
                    pool.add(new_conn.clone());
                });
            });

            // The new connection registered during the removal must stay
            // visible to liveness queries and fan-out.
            assert!(pool.is_online(&user));
            assert_eq!(pool.user_connections(&user).len(), 1);

            pool.remove(&new_conn.id);
        }
    }
}
