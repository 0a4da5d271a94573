//! Notification priority levels.

use serde::{Deserialize, Serialize};

/// Priority of a notification.
///
/// Derived from the notification kind at creation time but stored on the
/// record itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_priority", rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Background events.
    Low,
    /// Standard events.
    Medium,
    /// Important events the client should surface prominently.
    High,
}

impl NotificationPriority {
    /// Return the priority as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
