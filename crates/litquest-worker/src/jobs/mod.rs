//! Scheduled job implementations.

pub mod retention;
