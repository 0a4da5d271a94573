//! # litquest-auth
//!
//! Token validation and identity extraction for the LitQuest platform.
//!
//! Tokens are issued by the upstream identity service; this crate only
//! verifies them and exposes the embedded claims.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder};
