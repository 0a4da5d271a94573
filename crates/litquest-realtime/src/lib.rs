//! # litquest-realtime
//!
//! Real-time WebSocket delivery engine for LitQuest. Provides:
//!
//! - Connection registry with per-user indexing and device limits
//! - Pub/sub channel system with automatic per-user channels
//! - Fan-out dispatcher with serialize-once event delivery
//! - Delivery coordinator implementing store-first, push-second semantics
//!
//! Delivery is best-effort: the durable record in the store is the source
//! of truth, and a failed push is logged and skipped, never retried here.

pub mod channel;
pub mod connection;
pub mod coordinator;
pub mod dispatcher;
pub mod engine;
pub mod message;

pub use channel::registry::ChannelRegistry;
pub use connection::authenticator::WsAuthenticator;
pub use connection::manager::ConnectionManager;
pub use coordinator::DeliveryCoordinator;
pub use dispatcher::FanoutDispatcher;
pub use engine::RealtimeEngine;
