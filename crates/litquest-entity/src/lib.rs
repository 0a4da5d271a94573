//! # litquest-entity
//!
//! Entity models shared across the LitQuest notification service.

pub mod notification;
pub mod user;

pub use notification::{
    Notification, NotificationFilter, NotificationInput, NotificationKind, NotificationPriority,
};
pub use user::UserRole;
