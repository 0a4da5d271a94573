//! # litquest-database
//!
//! PostgreSQL persistence for the LitQuest notification service: pool
//! management, migrations, and the notification store.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::memory::MemoryNotificationStore;
pub use repositories::notification::PgNotificationStore;
pub use repositories::NotificationStore;
