//! Query execution errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for query execution.
pub type ExecuteResult<T> = Result<T, ExecuteError>;

/// Query execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("invalid number of children for {expr}: got {got}, expected {expected}")]
    InvalidChildrenNumber {
        expr: String,
        got: usize,
        expected: usize,
    },

    #[error("unresolved expression: {0}")]
    Unresolved(String),

    #[error("internal error: {0}")]
    Internal(String),
}
