//! Application state shared across all handlers.

use std::sync::Arc;

use litquest_auth::jwt::JwtDecoder;
use litquest_core::config::AppConfig;
use litquest_database::DatabasePool;
use litquest_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool wrapper, used by health checks.
    pub db: Arc<DatabasePool>,
    /// JWT decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Real-time delivery engine.
    pub engine: Arc<RealtimeEngine>,
}
