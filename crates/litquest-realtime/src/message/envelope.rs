//! Outbound event envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::ServerEvent;

/// Envelope wrapping every outbound event with delivery metadata.
///
/// The timestamp is assigned when the envelope is built, so it reflects
/// send time rather than any earlier store time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique message ID.
    pub id: Uuid,
    /// The event payload.
    #[serde(flatten)]
    pub event: ServerEvent,
    /// When the envelope was built for sending.
    pub timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    /// Wraps an event in a fresh envelope.
    pub fn new(event: ServerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            timestamp: Utc::now(),
        }
    }

    /// Serializes the envelope to its wire frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_flattens_event() {
        let envelope = EventEnvelope::new(ServerEvent::UnreadCount { unread_count: 2 });
        let json: serde_json::Value = serde_json::from_str(&envelope.to_frame().unwrap()).unwrap();

        assert_eq!(json["event"], "notification:unread_count");
        assert_eq!(json["data"]["unreadCount"], 2);
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_string());
    }
}
