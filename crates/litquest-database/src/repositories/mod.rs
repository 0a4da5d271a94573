//! Repository implementations and the store trait they satisfy.

pub mod memory;
pub mod notification;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use litquest_core::result::AppResult;
use litquest_core::types::pagination::{PageRequest, PageResponse};
use litquest_entity::notification::{
    Notification, NotificationFilter, NotificationInput, NotificationKind,
};

/// Persistence contract for notifications.
///
/// The production implementation is [`notification::PgNotificationStore`];
/// the trait seam exists so services can be exercised against an in-memory
/// store in tests. Ownership checks and read-state idempotence live in the
/// service layer, not here.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert a notification, generating its id and deriving priority from
    /// the kind. `read` defaults to false.
    async fn create(&self, input: &NotificationInput) -> AppResult<Notification>;

    /// Insert a batch of notifications in one transaction, in input order.
    async fn create_bulk(&self, inputs: &[NotificationInput]) -> AppResult<Vec<Notification>>;

    /// Fetch a notification by id, regardless of owner.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// List a user's notifications, newest first.
    async fn find_page(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Count unread notifications for a user.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;

    /// Count all notifications for a user.
    async fn count_total(&self, user_id: Uuid) -> AppResult<i64>;

    /// Per-kind tallies for a user, computed in a single grouped pass.
    async fn count_by_kind(&self, user_id: Uuid) -> AppResult<Vec<(NotificationKind, i64)>>;

    /// Set the read flag on a single notification and return the updated row.
    async fn set_read(&self, id: Uuid) -> AppResult<Notification>;

    /// Mark every unread notification of a user as read; returns the number
    /// of rows actually flipped.
    async fn set_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete a notification by id.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Delete all read notifications of a user; returns the deleted count.
    async fn delete_read(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete read notifications older than the cutoff, across all users.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
