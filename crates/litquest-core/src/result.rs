//! Convenience result type alias for LitQuest.

use crate::error::AppError;

/// A specialized `Result` type for LitQuest operations.
pub type AppResult<T> = Result<T, AppError>;
