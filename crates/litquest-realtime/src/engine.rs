//! Engine wiring for the real-time subsystem.

use std::sync::Arc;

use litquest_auth::jwt::JwtDecoder;
use litquest_core::config::RealtimeConfig;
use litquest_service::notification::NotificationService;

use crate::channel::registry::ChannelRegistry;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::manager::ConnectionManager;
use crate::coordinator::DeliveryCoordinator;
use crate::dispatcher::FanoutDispatcher;

/// The assembled real-time engine: one instance per process.
///
/// Routing is process-local; a load balancer with sticky sessions keeps
/// all of a user's connections on one instance.
pub struct RealtimeEngine {
    manager: Arc<ConnectionManager>,
    dispatcher: Arc<FanoutDispatcher>,
    coordinator: Arc<DeliveryCoordinator>,
    authenticator: WsAuthenticator,
}

impl RealtimeEngine {
    /// Wires up the engine from configuration and its collaborators.
    pub fn new(
        config: RealtimeConfig,
        service: Arc<NotificationService>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        let channels = Arc::new(ChannelRegistry::new());
        let manager = Arc::new(ConnectionManager::new(config, channels.clone()));
        let dispatcher = Arc::new(FanoutDispatcher::new(manager.pool().clone(), channels));
        let coordinator = Arc::new(DeliveryCoordinator::new(service, dispatcher.clone()));

        Self {
            manager,
            dispatcher,
            coordinator,
            authenticator: WsAuthenticator::new(decoder),
        }
    }

    /// The connection manager.
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// The fan-out dispatcher.
    pub fn dispatcher(&self) -> &Arc<FanoutDispatcher> {
        &self.dispatcher
    }

    /// The delivery coordinator.
    pub fn coordinator(&self) -> &Arc<DeliveryCoordinator> {
        &self.coordinator
    }

    /// The WebSocket authenticator.
    pub fn authenticator(&self) -> &WsAuthenticator {
        &self.authenticator
    }
}
