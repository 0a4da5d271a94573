//! Connection lifecycle: registration, eviction, and teardown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use litquest_core::config::RealtimeConfig;
use litquest_entity::user::UserRole;

use crate::channel::registry::ChannelRegistry;
use crate::channel::{user_channel, BROADCAST_CHANNEL};

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages the pool of active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    channels: Arc<ChannelRegistry>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, channels: Arc<ChannelRegistry>) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            channels,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// If the user is already at their device limit the oldest connection
    /// is evicted. Every connection is auto-subscribed to the user's
    /// personal channel. Returns the handle and the receiver the socket
    /// writer task drains.
    pub fn register(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, role, tx));

        let existing = self.pool.user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user_id,
                    evicted = %oldest.id,
                    max = self.config.max_connections_per_user,
                    "User at device limit, evicting oldest connection"
                );
                self.unregister(&oldest.id);
            }
        }

        self.pool.add(handle.clone());
        self.channels.subscribe(user_channel(&user_id), handle.id);

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection and tears down its subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.channels.unsubscribe_all(*conn_id);
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Subscribes a connection to a channel after a permission check.
    /// Returns an error code string when the subscription is refused.
    pub fn subscribe(&self, conn_id: &ConnectionId, channel: &str) -> Result<(), &'static str> {
        let handle = match self.pool.get(conn_id) {
            Some(h) => h,
            None => return Err("UNKNOWN_CONNECTION"),
        };

        if !Self::channel_allowed(&handle, channel) {
            debug!(conn_id = %conn_id, channel = %channel, "Subscription refused");
            return Err("FORBIDDEN_CHANNEL");
        }

        self.channels.subscribe(channel.to_string(), *conn_id);
        debug!(conn_id = %conn_id, channel = %channel, "Subscribed to channel");
        Ok(())
    }

    /// Unsubscribes a connection from a channel.
    pub fn unsubscribe(&self, conn_id: &ConnectionId, channel: &str) {
        self.channels.unsubscribe(channel, *conn_id);
    }

    /// Checks whether a connection may subscribe to a channel.
    ///
    /// Personal channels belong to exactly one user; guild and classroom
    /// channels are open (membership is enforced by the workflows that
    /// publish into them); admin channels require the admin role.
    fn channel_allowed(handle: &ConnectionHandle, channel: &str) -> bool {
        if channel == user_channel(&handle.user_id) {
            return true;
        }
        if channel.starts_with("user:") {
            return false;
        }
        if channel == BROADCAST_CHANNEL {
            return true;
        }
        if let Some(rest) = channel.strip_prefix("admin:") {
            return !rest.is_empty() && matches!(handle.role, UserRole::Admin);
        }
        channel.starts_with("guild:") || channel.starts_with("classroom:")
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// The channel registry.
    pub fn channels(&self) -> &Arc<ChannelRegistry> {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConnectionManager {
        ConnectionManager::new(
            RealtimeConfig {
                max_connections_per_user: 2,
                outbound_buffer_size: 8,
            },
            Arc::new(ChannelRegistry::new()),
        )
    }

    #[test]
    fn test_register_auto_subscribes_user_channel() {
        let mgr = manager();
        let user = Uuid::new_v4();

        let (handle, _rx) = mgr.register(user, UserRole::Student);

        assert_eq!(
            mgr.channels().channel_subscriber_count(&user_channel(&user)),
            1
        );
        assert!(mgr.pool().get(&handle.id).is_some());
    }

    #[test]
    fn test_device_limit_evicts_oldest() {
        let mgr = manager();
        let user = Uuid::new_v4();

        let (first, _rx1) = mgr.register(user, UserRole::Student);
        let (_second, _rx2) = mgr.register(user, UserRole::Student);
        let (_third, _rx3) = mgr.register(user, UserRole::Student);

        assert_eq!(mgr.pool().user_connections(&user).len(), 2);
        assert!(mgr.pool().get(&first.id).is_none());
        assert!(!first.is_alive());
    }

    #[test]
    fn test_unregister_cleans_up_subscriptions() {
        let mgr = manager();
        let user = Uuid::new_v4();

        let (handle, _rx) = mgr.register(user, UserRole::Student);
        mgr.subscribe(&handle.id, "guild:7").unwrap();

        mgr.unregister(&handle.id);

        assert_eq!(mgr.channels().channel_subscriber_count("guild:7"), 0);
        assert_eq!(
            mgr.channels().channel_subscriber_count(&user_channel(&user)),
            0
        );
        assert!(!mgr.pool().is_online(&user));
    }

    #[test]
    fn test_cannot_join_another_users_channel() {
        let mgr = manager();
        let (handle, _rx) = mgr.register(Uuid::new_v4(), UserRole::Student);

        let foreign = user_channel(&Uuid::new_v4());
        assert_eq!(
            mgr.subscribe(&handle.id, &foreign),
            Err("FORBIDDEN_CHANNEL")
        );
    }

    #[test]
    fn test_admin_channel_requires_admin() {
        let mgr = manager();
        let (student, _rx1) = mgr.register(Uuid::new_v4(), UserRole::Student);
        let (admin, _rx2) = mgr.register(Uuid::new_v4(), UserRole::Admin);

        assert!(mgr.subscribe(&student.id, "admin:alerts").is_err());
        assert!(mgr.subscribe(&admin.id, "admin:alerts").is_ok());
    }
}
