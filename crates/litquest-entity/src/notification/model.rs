//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;
use super::priority::NotificationPriority;

/// A persisted notification. The durable source of truth for what a user
/// has and has not seen; wire delivery is best-effort on top of this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier (server-generated).
    pub id: Uuid,
    /// The owning user; immutable after creation.
    pub user_id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Kind-specific structured payload.
    pub data: Option<serde_json::Value>,
    /// Priority, derived from `kind` at creation time.
    pub priority: NotificationPriority,
    /// Whether the owner has read this notification. Transitions only
    /// false -> true.
    pub read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification was last mutated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a notification on behalf of a business workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Kind-specific structured payload.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl NotificationInput {
    /// Convenience constructor for workflows that carry no extra payload.
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Optional filters for listing a user's notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    /// Restrict to a single kind.
    pub kind: Option<NotificationKind>,
    /// Restrict to read or unread records.
    pub read: Option<bool>,
}
