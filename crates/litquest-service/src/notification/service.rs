//! Notification CRUD with ownership enforcement.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use litquest_core::error::AppError;
use litquest_core::result::AppResult;
use litquest_core::types::pagination::{PageRequest, PageResponse};
use litquest_database::NotificationStore;
use litquest_entity::notification::{Notification, NotificationFilter, NotificationInput};

use crate::context::RequestContext;

use super::stats::NotificationStats;

/// Manages persisted notifications on behalf of workflows and users.
///
/// Creation paths take explicit recipient IDs because the caller is a
/// backend workflow acting on someone else's behalf; read and mutation
/// paths take a [`RequestContext`] and enforce that the caller owns the
/// record.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    /// Creates a new notification service over the given store.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Persists a single notification. Delivery is the caller's concern.
    pub async fn send(&self, input: &NotificationInput) -> AppResult<Notification> {
        let notification = self.store.create(input).await?;
        debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification stored"
        );
        Ok(notification)
    }

    /// Persists a batch of notifications in one transaction.
    pub async fn send_bulk(&self, inputs: &[NotificationInput]) -> AppResult<Vec<Notification>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let saved = self.store.create_bulk(inputs).await?;
        debug!(count = saved.len(), "Notification batch stored");
        Ok(saved)
    }

    /// Lists the current user's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.store.find_page(ctx.user_id, filter, page).await
    }

    /// Gets the unread notification count for the current user.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.store.count_unread(ctx.user_id).await
    }

    /// Gets the unread count for an arbitrary user.
    ///
    /// Used by delivery paths that need to tell a recipient their fresh
    /// badge count after a workflow created notifications for them.
    pub async fn unread_count_for(&self, user_id: Uuid) -> AppResult<i64> {
        self.store.count_unread(user_id).await
    }

    /// Marks a notification as read. Idempotent: marking an already-read
    /// notification succeeds without touching the row.
    pub async fn mark_read(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Notification> {
        let notification = self.owned(ctx, id).await?;
        if notification.read {
            return Ok(notification);
        }
        self.store.set_read(id).await
    }

    /// Marks all of the current user's notifications as read; returns the
    /// number of rows actually flipped.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.store.set_all_read(ctx.user_id).await
    }

    /// Deletes a notification owned by the current user.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        self.owned(ctx, id).await?;
        self.store.delete(id).await
    }

    /// Deletes all of the current user's read notifications; returns the
    /// deleted count.
    pub async fn clear_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.store.delete_read(ctx.user_id).await
    }

    /// Computes aggregate stats for the current user. Kinds with no
    /// notifications appear with a zero count.
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<NotificationStats> {
        let total = self.store.count_total(ctx.user_id).await?;
        let unread = self.store.count_unread(ctx.user_id).await?;
        let tally = self.store.count_by_kind(ctx.user_id).await?;
        Ok(NotificationStats::from_tally(total, unread, &tally))
    }

    /// Deletes read notifications older than the retention window, across
    /// all users. Called from the scheduled retention sweep.
    pub async fn purge_old(&self, retention_days: u32) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let purged = self.store.purge_older_than(cutoff).await?;
        if purged > 0 {
            debug!(purged, retention_days, "Purged old read notifications");
        }
        Ok(purged)
    }

    /// Fetches a notification and verifies the caller owns it.
    async fn owned(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Notification> {
        let notification = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;

        if notification.user_id != ctx.user_id {
            warn!(
                notification_id = %id,
                owner_id = %notification.user_id,
                caller_id = %ctx.user_id,
                "Rejected access to another user's notification"
            );
            return Err(AppError::authorization(
                "Notification belongs to another user",
            ));
        }

        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use litquest_core::error::ErrorKind;
    use litquest_database::MemoryNotificationStore;
    use litquest_entity::notification::NotificationKind;
    use litquest_entity::user::UserRole;

    use super::*;

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(MemoryNotificationStore::new()))
    }

    fn ctx_for(user_id: Uuid) -> RequestContext {
        RequestContext::new(
            user_id,
            "kenta@example.com".to_string(),
            UserRole::Student,
            Uuid::new_v4(),
        )
    }

    fn input_for(user_id: Uuid) -> NotificationInput {
        NotificationInput::new(
            user_id,
            NotificationKind::AchievementUnlocked,
            "Achievement unlocked",
            "You earned the Bookworm badge",
        )
    }

    #[tokio::test]
    async fn test_send_stores_unread_with_derived_priority() {
        let svc = service();
        let user = Uuid::new_v4();

        let saved = svc
            .send(&NotificationInput::new(
                user,
                NotificationKind::RankUp,
                "Rank up",
                "You reached Silver",
            ))
            .await
            .unwrap();

        assert!(!saved.read);
        assert_eq!(
            saved.priority,
            NotificationKind::RankUp.default_priority()
        );
        assert_eq!(svc.unread_count_for(user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let svc = service();
        let user = Uuid::new_v4();
        let ctx = ctx_for(user);

        let saved = svc.send(&input_for(user)).await.unwrap();

        let first = svc.mark_read(&ctx, saved.id).await.unwrap();
        assert!(first.read);
        let updated_at = first.updated_at;

        // Second call succeeds and does not rewrite the row.
        let second = svc.mark_read(&ctx, saved.id).await.unwrap();
        assert!(second.read);
        assert_eq!(second.updated_at, updated_at);
    }

    #[tokio::test]
    async fn test_mark_read_rejects_other_users() {
        let svc = service();
        let owner = Uuid::new_v4();
        let intruder = ctx_for(Uuid::new_v4());

        let saved = svc.send(&input_for(owner)).await.unwrap();

        let err = svc.mark_read(&intruder, saved.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        // The record is untouched.
        assert_eq!(svc.unread_count_for(owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_missing_is_not_found() {
        let svc = service();
        let ctx = ctx_for(Uuid::new_v4());

        let err = svc.mark_read(&ctx, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_enforces_ownership() {
        let svc = service();
        let owner = Uuid::new_v4();
        let ctx = ctx_for(owner);
        let intruder = ctx_for(Uuid::new_v4());

        let saved = svc.send(&input_for(owner)).await.unwrap();

        let err = svc.delete(&intruder, saved.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        svc.delete(&ctx, saved.id).await.unwrap();
        assert_eq!(svc.unread_count_for(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read_reports_flipped_rows() {
        let svc = service();
        let user = Uuid::new_v4();
        let ctx = ctx_for(user);

        let a = svc.send(&input_for(user)).await.unwrap();
        svc.send(&input_for(user)).await.unwrap();
        svc.send(&input_for(user)).await.unwrap();
        svc.mark_read(&ctx, a.id).await.unwrap();

        assert_eq!(svc.mark_all_read(&ctx).await.unwrap(), 2);
        assert_eq!(svc.unread_count(&ctx).await.unwrap(), 0);
        // Nothing left to flip.
        assert_eq!(svc.mark_all_read(&ctx).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_read_leaves_unread() {
        let svc = service();
        let user = Uuid::new_v4();
        let ctx = ctx_for(user);

        let a = svc.send(&input_for(user)).await.unwrap();
        svc.send(&input_for(user)).await.unwrap();
        svc.mark_read(&ctx, a.id).await.unwrap();

        assert_eq!(svc.clear_read(&ctx).await.unwrap(), 1);

        let page = svc
            .list(&ctx, &NotificationFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert!(!page.items[0].read);
    }

    #[tokio::test]
    async fn test_stats_cover_every_kind() {
        let svc = service();
        let user = Uuid::new_v4();
        let ctx = ctx_for(user);

        svc.send(&input_for(user)).await.unwrap();
        svc.send(&NotificationInput::new(
            user,
            NotificationKind::LevelUp,
            "Level up",
            "Welcome to level 7",
        ))
        .await
        .unwrap();

        let stats = svc.stats(&ctx).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.by_kind.len(), NotificationKind::ALL.len());
        assert!(stats
            .by_kind
            .iter()
            .any(|c| c.kind == NotificationKind::LevelUp && c.count == 1));
    }

    #[tokio::test]
    async fn test_list_filters_by_read_state() {
        let svc = service();
        let user = Uuid::new_v4();
        let ctx = ctx_for(user);

        let a = svc.send(&input_for(user)).await.unwrap();
        svc.send(&input_for(user)).await.unwrap();
        svc.mark_read(&ctx, a.id).await.unwrap();

        let filter = NotificationFilter {
            read: Some(false),
            ..Default::default()
        };
        let page = svc
            .list(&ctx, &filter, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
    }
}
