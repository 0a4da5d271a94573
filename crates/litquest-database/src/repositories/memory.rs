//! In-memory notification store using a Tokio mutex.
//!
//! Suitable for local development and tests; the production backend is
//! [`super::notification::PgNotificationStore`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use litquest_core::error::AppError;
use litquest_core::result::AppResult;
use litquest_core::types::pagination::{PageRequest, PageResponse};
use litquest_entity::notification::{
    Notification, NotificationFilter, NotificationInput, NotificationKind,
};

use super::NotificationStore;

/// In-memory notification store backed by a `Vec` under a Tokio mutex.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationStore {
    rows: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn materialize(input: &NotificationInput) -> Notification {
        let now = Utc::now();
        Notification {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            kind: input.kind,
            title: input.title.clone(),
            message: input.message.clone(),
            data: input.data.clone(),
            priority: input.kind.default_priority(),
            read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, input: &NotificationInput) -> AppResult<Notification> {
        let notification = Self::materialize(input);
        self.rows.lock().await.push(notification.clone());
        Ok(notification)
    }

    async fn create_bulk(&self, inputs: &[NotificationInput]) -> AppResult<Vec<Notification>> {
        let mut rows = self.rows.lock().await;
        let mut saved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let notification = Self::materialize(input);
            rows.push(notification.clone());
            saved.push(notification);
        }
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|n| n.id == id).cloned())
    }

    async fn find_page(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let rows = self.rows.lock().await;
        let mut matched: Vec<Notification> = rows
            .iter()
            .filter(|n| n.user_id == user_id)
            .filter(|n| filter.kind.map_or(true, |k| n.kind == k))
            .filter(|n| filter.read.map_or(true, |r| n.read == r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|n| n.user_id == user_id && !n.read).count() as i64)
    }

    async fn count_total(&self, user_id: Uuid) -> AppResult<i64> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|n| n.user_id == user_id).count() as i64)
    }

    async fn count_by_kind(&self, user_id: Uuid) -> AppResult<Vec<(NotificationKind, i64)>> {
        let rows = self.rows.lock().await;
        let mut tally: Vec<(NotificationKind, i64)> = Vec::new();
        for n in rows.iter().filter(|n| n.user_id == user_id) {
            match tally.iter_mut().find(|(k, _)| *k == n.kind) {
                Some((_, count)) => *count += 1,
                None => tally.push((n.kind, 1)),
            }
        }
        Ok(tally)
    }

    async fn set_read(&self, id: Uuid) -> AppResult<Notification> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        row.read = true;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn set_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut updated = 0;
        for row in rows.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            row.read = true;
            row.updated_at = Utc::now();
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows.lock().await.retain(|n| n.id != id);
        Ok(())
    }

    async fn delete_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|n| !(n.user_id == user_id && n.read));
        Ok((before - rows.len()) as u64)
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|n| !(n.read && n.created_at < cutoff));
        Ok((before - rows.len()) as u64)
    }
}
