//! Channel registry, managing all channels and subscriptions.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Registry of all active pub/sub channels.
///
/// Channels are created lazily on first subscribe and removed when their
/// last subscriber leaves. Holds both directions of the relationship: the
/// member set per channel for fan-out, and the channel set per connection
/// so a disconnect can tear down all of its subscriptions in one pass.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Channel name -> subscribed connection IDs.
    members: DashMap<String, HashSet<ConnectionId>>,
    /// Connection ID -> channel names, the reverse index.
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a channel.
    pub fn subscribe(&self, channel_name: String, conn_id: ConnectionId) {
        self.members
            .entry(channel_name.clone())
            .or_default()
            .insert(conn_id);
        self.memberships
            .entry(conn_id)
            .or_default()
            .insert(channel_name);
    }

    /// Unsubscribes a connection from a channel.
    pub fn unsubscribe(&self, channel_name: &str, conn_id: ConnectionId) {
        if let Some(mut members) = self.members.get_mut(channel_name) {
            members.remove(&conn_id);
        }
        // Emptiness is checked under the entry lock so a concurrent
        // subscribe cannot lose its channel to this cleanup.
        self.members
            .remove_if(channel_name, |_, members| members.is_empty());

        if let Some(mut channels) = self.memberships.get_mut(&conn_id) {
            channels.remove(channel_name);
        }
        self.memberships
            .remove_if(&conn_id, |_, channels| channels.is_empty());
    }

    /// Unsubscribes a connection from all channels.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let channels = self
            .memberships
            .remove(&conn_id)
            .map(|(_, channels)| channels)
            .unwrap_or_default();

        for channel_name in &channels {
            if let Some(mut members) = self.members.get_mut(channel_name) {
                members.remove(&conn_id);
            }
            self.members
                .remove_if(channel_name, |_, members| members.is_empty());
        }
    }

    /// Returns all subscriber connection IDs for a channel.
    pub fn subscribers(&self, channel_name: &str) -> Vec<ConnectionId> {
        self.members
            .get(channel_name)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the subscription count for a connection.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.memberships
            .get(&conn_id)
            .map(|channels| channels.len())
            .unwrap_or(0)
    }

    /// Returns the subscriber count for a channel.
    pub fn channel_subscriber_count(&self, channel_name: &str) -> usize {
        self.members
            .get(channel_name)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    /// Returns the total number of active channels.
    pub fn channel_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_channels_created_and_removed_lazily() {
        let registry = ChannelRegistry::new();
        let conn = Uuid::new_v4();

        assert_eq!(registry.channel_count(), 0);

        registry.subscribe("guild:42".to_string(), conn);
        assert_eq!(registry.channel_count(), 1);
        assert_eq!(registry.channel_subscriber_count("guild:42"), 1);

        registry.unsubscribe("guild:42", conn);
        assert_eq!(registry.channel_count(), 0);
        assert_eq!(registry.subscription_count(conn), 0);
    }

    #[test]
    fn test_unsubscribe_all_tears_down_every_channel() {
        let registry = ChannelRegistry::new();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();

        registry.subscribe("guild:1".to_string(), conn);
        registry.subscribe("classroom:2".to_string(), conn);
        registry.subscribe("classroom:2".to_string(), other);

        registry.unsubscribe_all(conn);

        assert_eq!(registry.subscription_count(conn), 0);
        // The shared channel survives with its remaining subscriber.
        assert_eq!(registry.channel_subscriber_count("classroom:2"), 1);
        assert_eq!(registry.channel_count(), 1);
    }

    #[test]
    fn test_subscribers_of_unknown_channel_is_empty() {
        let registry = ChannelRegistry::new();
        assert!(registry.subscribers("nope").is_empty());
    }

    #[test]
    fn test_concurrent_subscribe_survives_last_unsubscribe() {
        let registry = ChannelRegistry::new();

        for _ in 0..2000 {
            let leaver = Uuid::new_v4();
            let joiner = Uuid::new_v4();
            registry.subscribe("guild:9".to_string(), leaver);

            std::thread::scope(|s| {
                s.spawn(|| {
                    registry.unsubscribe("guild:9", leaver);
                });
                s.spawn(|| {
                    registry.subscribe("guild:9".to_string(), joiner);
                });
            });

            // Whoever joined during the departure must still be reachable.
            assert_eq!(registry.channel_subscriber_count("guild:9"), 1);
            assert_eq!(registry.subscribers("guild:9"), vec![joiner]);

            registry.unsubscribe("guild:9", joiner);
        }
    }
}
