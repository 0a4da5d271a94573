//! PostgreSQL notification store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use litquest_core::error::{AppError, ErrorKind};
use litquest_core::result::AppResult;
use litquest_core::types::pagination::{PageRequest, PageResponse};
use litquest_entity::notification::{
    Notification, NotificationFilter, NotificationInput, NotificationKind,
};

use super::NotificationStore;

/// sqlx-backed notification store over a single `notifications` table.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn db_err(context: &str, e: sqlx::Error) -> AppError {
        AppError::with_source(ErrorKind::Database, format!("{context}: {e}"), e)
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, input: &NotificationInput) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, kind, title, message, data, priority) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(input.user_id)
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.message)
        .bind(&input.data)
        .bind(input.kind.default_priority())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to create notification", e))
    }

    async fn create_bulk(&self, inputs: &[NotificationInput]) -> AppResult<Vec<Notification>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_err("Failed to begin transaction", e))?;

        let mut saved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let notification = sqlx::query_as::<_, Notification>(
                "INSERT INTO notifications (user_id, kind, title, message, data, priority) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
            )
            .bind(input.user_id)
            .bind(input.kind)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.data)
            .bind(input.kind.default_priority())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| Self::db_err("Failed to create notification in batch", e))?;
            saved.push(notification);
        }

        tx.commit()
            .await
            .map_err(|e| Self::db_err("Failed to commit batch", e))?;

        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to fetch notification", e))
    }

    async fn find_page(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let mut count_query: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM notifications WHERE user_id = ");
        count_query.push_bind(user_id);
        push_filter(&mut count_query, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to count notifications", e))?;

        let mut select_query: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM notifications WHERE user_id = ");
        select_query.push_bind(user_id);
        push_filter(&mut select_query, filter);
        select_query.push(" ORDER BY created_at DESC LIMIT ");
        select_query.push_bind(page.limit() as i64);
        select_query.push(" OFFSET ");
        select_query.push_bind(page.offset() as i64);

        let items = select_query
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to list notifications", e))?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to count unread", e))
    }

    async fn count_total(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to count notifications", e))
    }

    async fn count_by_kind(&self, user_id: Uuid) -> AppResult<Vec<(NotificationKind, i64)>> {
        sqlx::query_as::<_, (NotificationKind, i64)>(
            "SELECT kind, COUNT(*) FROM notifications WHERE user_id = $1 GROUP BY kind",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to tally notifications by kind", e))
    }

    async fn set_read(&self, id: Uuid) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to mark notification read", e))
    }

    async fn set_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to delete notification", e))?;
        Ok(())
    }

    async fn delete_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1 AND read = TRUE")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to clear read notifications", e))?;
        Ok(result.rows_affected())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE read = TRUE AND created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to purge old notifications", e))?;
        Ok(result.rows_affected())
    }
}

/// Append optional kind/read predicates to a WHERE clause.
fn push_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &NotificationFilter) {
    if let Some(kind) = filter.kind {
        query.push(" AND kind = ");
        query.push_bind(kind);
    }
    if let Some(read) = filter.read {
        query.push(" AND read = ");
        query.push_bind(read);
    }
}
