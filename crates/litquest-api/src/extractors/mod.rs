//! Request extractors.

pub mod auth;
pub mod pagination;

pub use auth::AuthUser;
pub use pagination::PaginationParams;
