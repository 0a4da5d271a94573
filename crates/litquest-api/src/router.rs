//! Route definitions for the LitQuest HTTP API.

use axum::routing::{delete, get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::build_cors_layer;
use crate::state::AppState;

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_handler));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Notification query and mutation endpoints.
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route("/notifications/stats", get(handlers::notification::stats))
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/read",
            delete(handlers::notification::clear_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete),
        )
}

/// Liveness and readiness endpoints.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
