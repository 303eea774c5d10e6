//! Convenience result type alias for hookstore.

use crate::error::AppError;

/// A specialized `Result` type for hookstore operations.
pub type AppResult<T> = Result<T, AppError>;
