//! Typed events exchanged over the WebSocket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use litquest_entity::notification::Notification;

/// Events pushed from the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A freshly stored notification for the recipient.
    #[serde(rename = "notification:new")]
    NotificationNew {
        /// The stored notification, exactly as persisted.
        notification: Notification,
    },
    /// The recipient's current unread badge count.
    #[serde(rename = "notification:unread_count")]
    #[serde(rename_all = "camelCase")]
    UnreadCount {
        /// Unread count re-queried from the store.
        unread_count: i64,
    },
    /// Acknowledges that a notification transitioned to read.
    #[serde(rename = "notification:read")]
    #[serde(rename_all = "camelCase")]
    NotificationRead {
        /// The notification that was marked read.
        notification_id: Uuid,
        /// Whether the mutation was applied.
        success: bool,
    },
    /// All of the recipient's notifications were marked read.
    #[serde(rename = "notification:all_read")]
    #[serde(rename_all = "camelCase")]
    AllRead {
        /// How many rows were actually flipped.
        updated: u64,
    },
    /// A notification was deleted.
    #[serde(rename = "notification:deleted")]
    #[serde(rename_all = "camelCase")]
    NotificationDeleted {
        /// The deleted notification.
        notification_id: Uuid,
    },
    /// Platform-wide announcement pushed to every connection.
    #[serde(rename = "system:announcement")]
    Announcement {
        /// Announcement title.
        title: String,
        /// Announcement body.
        message: String,
    },
    /// Sent once per successful admission, right after registration.
    #[serde(rename = "authenticated")]
    #[serde(rename_all = "camelCase")]
    Authenticated {
        /// The authenticated user.
        user_id: Uuid,
        /// The user's email from the token claims.
        email: String,
        /// The server-assigned connection ID.
        connection_id: Uuid,
    },
    /// A gamification achievement was unlocked.
    #[serde(rename = "achievement:unlocked")]
    #[serde(rename_all = "camelCase")]
    AchievementUnlocked {
        /// The unlocked achievement.
        achievement_id: Uuid,
        /// Achievement title.
        title: String,
        /// Achievement description.
        description: String,
        /// Icon identifier.
        icon: String,
    },
    /// The user's rank changed.
    #[serde(rename = "rank:updated")]
    #[serde(rename_all = "camelCase")]
    RankUpdated {
        /// The new rank.
        new_rank: String,
        /// The previous rank.
        old_rank: String,
        /// XP required for the next rank, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        xp_required: Option<i64>,
    },
    /// The user gained experience points.
    #[serde(rename = "xp:gained")]
    #[serde(rename_all = "camelCase")]
    XpGained {
        /// XP gained in this event.
        amount: i64,
        /// What granted the XP.
        source: String,
        /// The user's total XP after the gain.
        total_xp: i64,
    },
    /// A mission was completed.
    #[serde(rename = "mission:completed")]
    #[serde(rename_all = "camelCase")]
    MissionCompleted {
        /// The completed mission.
        mission_id: Uuid,
        /// Mission title.
        title: String,
        /// XP rewarded.
        xp_reward: i64,
        /// Points rewarded.
        points_reward: i64,
    },
    /// Progress on an in-flight mission.
    #[serde(rename = "mission:progress")]
    #[serde(rename_all = "camelCase")]
    MissionProgress {
        /// The mission being progressed.
        mission_id: Uuid,
        /// Current progress value.
        current_progress: i64,
        /// Target progress value.
        target_progress: i64,
        /// Completion percentage.
        percentage: f64,
    },
    /// A leaderboard changed; broadcast to every connection.
    #[serde(rename = "leaderboard:updated")]
    LeaderboardUpdated {
        /// The refreshed leaderboard payload.
        leaderboard: serde_json::Value,
    },
    /// Heartbeat response.
    #[serde(rename = "pong")]
    Pong {
        /// Echoed client timestamp.
        timestamp: i64,
    },
    /// Error report for a rejected client event.
    #[serde(rename = "error")]
    Error {
        /// Stable error code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

/// Events sent from the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Mark a single notification as read.
    #[serde(rename = "notification:mark_read")]
    #[serde(rename_all = "camelCase")]
    MarkRead {
        /// The notification to mark.
        notification_id: Uuid,
    },
    /// Mark all of the caller's notifications as read.
    #[serde(rename = "notification:mark_all_read")]
    MarkAllRead,
    /// Subscribe to a channel.
    #[serde(rename = "subscribe")]
    Subscribe {
        /// Channel name.
        channel: String,
    },
    /// Unsubscribe from a channel.
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        /// Channel name.
        channel: String,
    },
    /// Heartbeat request.
    #[serde(rename = "ping")]
    Ping {
        /// Client timestamp, echoed back in the pong.
        timestamp: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_wire_shape() {
        let event = ServerEvent::UnreadCount { unread_count: 7 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "notification:unread_count");
        assert_eq!(json["data"]["unreadCount"], 7);
    }

    #[test]
    fn test_rank_update_omits_absent_xp_requirement() {
        let event = ServerEvent::RankUpdated {
            new_rank: "Gold".to_string(),
            old_rank: "Silver".to_string(),
            xp_required: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "rank:updated");
        assert!(json["data"].get("xpRequired").is_none());
    }

    #[test]
    fn test_client_event_parses_mark_read() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"event":"notification:mark_read","data":{{"notificationId":"{id}"}}}}"#
        );
        let event: ClientEvent = serde_json::from_str(&raw).unwrap();
        assert!(matches!(
            event,
            ClientEvent::MarkRead { notification_id } if notification_id == id
        ));
    }

    #[test]
    fn test_client_event_parses_unit_variant() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"notification:mark_all_read"}"#).unwrap();
        assert!(matches!(event, ClientEvent::MarkAllRead));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"event":"hack:the:planet"}"#);
        assert!(result.is_err());
    }
}
