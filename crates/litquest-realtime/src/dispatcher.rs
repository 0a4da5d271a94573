//! Fan-out dispatcher, pushing events to connections.

use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use crate::channel::registry::ChannelRegistry;
use crate::connection::pool::ConnectionPool;
use crate::message::envelope::EventEnvelope;
use crate::message::events::ServerEvent;

/// Pushes events to live connections.
///
/// Events are wrapped in an envelope and serialized exactly once per
/// fan-out; each target connection gets a clone of the finished frame.
/// Delivery is best-effort: a dead or slow connection is skipped.
#[derive(Debug)]
pub struct FanoutDispatcher {
    pool: Arc<ConnectionPool>,
    channels: Arc<ChannelRegistry>,
}

impl FanoutDispatcher {
    /// Creates a new dispatcher over the given pool and registry.
    pub fn new(pool: Arc<ConnectionPool>, channels: Arc<ChannelRegistry>) -> Self {
        Self { pool, channels }
    }

    /// Emits an event to all of a user's connections.
    ///
    /// An offline user is not an error; the event simply goes nowhere
    /// because the store already holds the durable record.
    pub fn emit_to_user(&self, user_id: &Uuid, event: &ServerEvent) {
        let connections = self.pool.user_connections(user_id);
        if connections.is_empty() {
            return;
        }

        let frame = match self.serialize(event) {
            Some(f) => f,
            None => return,
        };

        let mut delivered = 0usize;
        for conn in &connections {
            if conn.send(frame.clone()) {
                delivered += 1;
            }
        }
        debug!(
            user_id = %user_id,
            delivered,
            targets = connections.len(),
            "Event fanned out to user"
        );
    }

    /// Emits an event to several users, serializing once.
    pub fn emit_to_users(&self, user_ids: &[Uuid], event: &ServerEvent) {
        let frame = match self.serialize(event) {
            Some(f) => f,
            None => return,
        };

        for user_id in user_ids {
            for conn in self.pool.user_connections(user_id) {
                conn.send(frame.clone());
            }
        }
    }

    /// Emits an event to all subscribers of a channel.
    pub fn emit_to_channel(&self, channel: &str, event: &ServerEvent) {
        let subscriber_ids = self.channels.subscribers(channel);
        if subscriber_ids.is_empty() {
            return;
        }

        let frame = match self.serialize(event) {
            Some(f) => f,
            None => return,
        };

        for conn_id in &subscriber_ids {
            if let Some(handle) = self.pool.get(conn_id) {
                handle.send(frame.clone());
            }
        }
    }

    /// Broadcasts an event to every live connection.
    pub fn broadcast(&self, event: &ServerEvent) {
        let connections = self.pool.all_connections();
        if connections.is_empty() {
            return;
        }

        let frame = match self.serialize(event) {
            Some(f) => f,
            None => return,
        };

        for conn in &connections {
            conn.send(frame.clone());
        }
        debug!(targets = connections.len(), "Event broadcast");
    }

    /// Emits an event to one specific connection.
    pub fn emit_to_connection(&self, conn_id: &Uuid, event: &ServerEvent) {
        if let Some(handle) = self.pool.get(conn_id) {
            if let Some(frame) = self.serialize(event) {
                handle.send(frame);
            }
        }
    }

    fn serialize(&self, event: &ServerEvent) -> Option<String> {
        match EventEnvelope::new(event.clone()).to_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound event");
                None
            }
        }
    }
}
