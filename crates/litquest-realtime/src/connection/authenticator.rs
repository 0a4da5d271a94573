//! WebSocket authentication, validating the token presented at upgrade.

use std::sync::Arc;

use uuid::Uuid;

use litquest_auth::jwt::JwtDecoder;
use litquest_core::error::AppError;
use litquest_entity::user::UserRole;

/// Authenticated identity extracted from a verified token.
#[derive(Debug, Clone)]
pub struct AuthenticatedConnection {
    /// User ID.
    pub user_id: Uuid,
    /// User email.
    pub email: String,
    /// User role.
    pub role: UserRole,
    /// Tenant the user belongs to.
    pub tenant_id: Uuid,
}

/// Authenticates WebSocket upgrades using bearer tokens.
///
/// The token arrives as a query parameter because browsers cannot set
/// headers on WebSocket upgrade requests.
#[derive(Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Validates a token and extracts the connection identity.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedConnection, AppError> {
        let claims = self.decoder.decode(token)?;

        Ok(AuthenticatedConnection {
            user_id: claims.user_id(),
            email: claims.email.clone(),
            role: claims.role,
            tenant_id: claims.tenant_id(),
        })
    }
}
