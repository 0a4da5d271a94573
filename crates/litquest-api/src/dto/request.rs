//! Request DTOs.

use serde::{Deserialize, Serialize};

use litquest_entity::notification::{NotificationFilter, NotificationKind};

/// Optional filter query parameters for the notification list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilterParams {
    /// Restrict to a single kind.
    pub kind: Option<NotificationKind>,
    /// Restrict to read or unread records.
    pub read: Option<bool>,
}

impl NotificationFilterParams {
    /// Converts to the domain filter.
    pub fn into_filter(self) -> NotificationFilter {
        NotificationFilter {
            kind: self.kind,
            read: self.read,
        }
    }
}
