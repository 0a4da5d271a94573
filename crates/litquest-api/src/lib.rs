//! # litquest-api
//!
//! HTTP API layer for the LitQuest notification service, built on Axum.
//!
//! Provides the REST query surface, the WebSocket upgrade endpoint,
//! extractors, DTOs, CORS, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
