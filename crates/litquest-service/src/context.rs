//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use litquest_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Extracted from verified token claims and passed into service methods
/// so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's email (convenience field from token claims).
    pub email: String,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The tenant (school) the user belongs to.
    pub tenant_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, email: String, role: UserRole, tenant_id: Uuid) -> Self {
        Self {
            user_id,
            email,
            role,
            tenant_id,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
