//! Pub/sub channels and subscription tracking.

pub mod registry;

pub use registry::ChannelRegistry;

/// Name of a user's personal channel, auto-subscribed on connect.
pub fn user_channel(user_id: &uuid::Uuid) -> String {
    format!("user:{user_id}")
}

/// Channel that every connection may join for platform-wide events.
pub const BROADCAST_CHANNEL: &str = "broadcast:all";
