//! Notification entity and its closed enumerations.

pub mod kind;
pub mod model;
pub mod priority;

pub use kind::NotificationKind;
pub use model::{Notification, NotificationFilter, NotificationInput};
pub use priority::NotificationPriority;
