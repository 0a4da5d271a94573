//! Notification business logic.

pub mod service;
pub mod stats;

pub use service::NotificationService;
pub use stats::NotificationStats;
