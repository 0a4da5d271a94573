//! Health check handlers.

use axum::extract::State;
use axum::Json;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let database = match state.db.health_check().await {
        Ok(true) => "connected",
        _ => "unavailable",
    };

    let pool = state.engine.manager().pool();

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
        ws_connections: pool.connection_count(),
        online_users: pool.user_count(),
    }))
}
