//! User-related types consumed from token claims.

pub mod role;

pub use role::UserRole;
