//! Notification REST handlers.
//!
//! Mutations go through the delivery coordinator so that any live
//! connections of the caller see the change immediately.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use litquest_core::types::pagination::PageResponse;
use litquest_entity::notification::Notification;
use litquest_service::notification::NotificationStats;

use crate::dto::request::NotificationFilterParams;
use crate::dto::response::{AffectedResponse, ApiResponse, CountResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<NotificationFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Notification>>>, ApiError> {
    let page = state
        .engine
        .coordinator()
        .list(
            &auth,
            &filter.into_filter(),
            &pagination.into_page_request(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.engine.coordinator().unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// GET /api/notifications/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<NotificationStats>>, ApiError> {
    let stats = state.engine.coordinator().stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let notification = state.engine.coordinator().mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state.engine.coordinator().mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(AffectedResponse { affected })))
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.engine.coordinator().delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Deleted".to_string(),
    })))
}

/// DELETE /api/notifications/read
pub async fn clear_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state.engine.coordinator().clear_read(&auth).await?;
    Ok(Json(ApiResponse::ok(AffectedResponse { affected })))
}
