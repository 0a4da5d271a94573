//! Delivery coordinator: store first, push second.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use litquest_core::result::AppResult;
use litquest_core::types::pagination::{PageRequest, PageResponse};
use litquest_entity::notification::{Notification, NotificationFilter, NotificationInput};
use litquest_service::context::RequestContext;
use litquest_service::notification::{NotificationService, NotificationStats};

use crate::dispatcher::FanoutDispatcher;
use crate::message::events::ServerEvent;

/// Orchestrates notification persistence and real-time delivery.
///
/// Every mutating operation persists through the service before anything
/// touches the wire, so a crash between the two steps loses only the
/// push, never the record. Unread counts pushed to clients are always
/// re-queried from the store after the mutation.
pub struct DeliveryCoordinator {
    service: Arc<NotificationService>,
    dispatcher: Arc<FanoutDispatcher>,
}

impl DeliveryCoordinator {
    /// Creates a new coordinator.
    pub fn new(service: Arc<NotificationService>, dispatcher: Arc<FanoutDispatcher>) -> Self {
        Self {
            service,
            dispatcher,
        }
    }

    /// Stores a notification, then pushes it and a fresh unread count to
    /// the recipient's connections.
    pub async fn send(&self, input: &NotificationInput) -> AppResult<Notification> {
        let notification = self.service.send(input).await?;

        self.dispatcher.emit_to_user(
            &notification.user_id,
            &ServerEvent::NotificationNew {
                notification: notification.clone(),
            },
        );
        self.push_unread_count(notification.user_id).await;

        Ok(notification)
    }

    /// Stores a batch of notifications, pushes each to its recipient, and
    /// then pushes exactly one unread count per distinct recipient.
    pub async fn send_bulk(&self, inputs: &[NotificationInput]) -> AppResult<Vec<Notification>> {
        let saved = self.service.send_bulk(inputs).await?;

        let mut recipients: HashSet<Uuid> = HashSet::new();
        for notification in &saved {
            recipients.insert(notification.user_id);
            self.dispatcher.emit_to_user(
                &notification.user_id,
                &ServerEvent::NotificationNew {
                    notification: notification.clone(),
                },
            );
        }
        for user_id in recipients {
            self.push_unread_count(user_id).await;
        }

        Ok(saved)
    }

    /// Marks a notification read, then pushes the acknowledgement and the
    /// fresh unread count to the owner's connections.
    pub async fn mark_read(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Notification> {
        let notification = self.service.mark_read(ctx, id).await?;

        self.dispatcher.emit_to_user(
            &ctx.user_id,
            &ServerEvent::NotificationRead {
                notification_id: notification.id,
                success: true,
            },
        );
        self.push_unread_count(ctx.user_id).await;

        Ok(notification)
    }

    /// Marks everything read, then pushes the result to the owner.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let updated = self.service.mark_all_read(ctx).await?;

        self.dispatcher
            .emit_to_user(&ctx.user_id, &ServerEvent::AllRead { updated });
        self.push_unread_count(ctx.user_id).await;

        Ok(updated)
    }

    /// Deletes a notification, then tells the owner's connections.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        self.service.delete(ctx, id).await?;

        self.dispatcher.emit_to_user(
            &ctx.user_id,
            &ServerEvent::NotificationDeleted {
                notification_id: id,
            },
        );
        self.push_unread_count(ctx.user_id).await;

        Ok(())
    }

    /// Deletes the caller's read notifications.
    pub async fn clear_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.service.clear_read(ctx).await
    }

    /// Lists the caller's notifications.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.service.list(ctx, filter, page).await
    }

    /// The caller's unread count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.service.unread_count(ctx).await
    }

    /// An arbitrary user's unread count, for the connect-time greeting.
    pub async fn unread_count_for(&self, user_id: Uuid) -> AppResult<i64> {
        self.service.unread_count_for(user_id).await
    }

    /// The caller's aggregate stats.
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<NotificationStats> {
        self.service.stats(ctx).await
    }

    /// Deletes read notifications older than the retention window. Purged
    /// rows were read long ago, so nothing is pushed.
    pub async fn purge_old(&self, retention_days: u32) -> AppResult<u64> {
        self.service.purge_old(retention_days).await
    }

    /// Pushes a platform announcement to every connection.
    pub fn announce(&self, title: String, message: String) {
        self.dispatcher
            .broadcast(&ServerEvent::Announcement { title, message });
    }

    /// Broadcasts a refreshed leaderboard to every connection.
    pub fn publish_leaderboard(&self, leaderboard: serde_json::Value) {
        self.dispatcher
            .broadcast(&ServerEvent::LeaderboardUpdated { leaderboard });
    }

    /// Re-queries and pushes a user's unread count. Best-effort: a store
    /// failure here is logged, not propagated, because the mutation that
    /// triggered it already committed.
    async fn push_unread_count(&self, user_id: Uuid) {
        match self.service.unread_count_for(user_id).await {
            Ok(unread_count) => {
                self.dispatcher
                    .emit_to_user(&user_id, &ServerEvent::UnreadCount { unread_count });
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to refresh unread count");
            }
        }
    }
}
