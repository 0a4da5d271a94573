//! # litquest-service
//!
//! Business logic for the LitQuest notification service. Services enforce
//! ownership and read-state semantics on top of the persistence layer;
//! wire delivery is layered on by `litquest-realtime`.

pub mod context;
pub mod notification;

pub use context::RequestContext;
pub use notification::{NotificationService, NotificationStats};
