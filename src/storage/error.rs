//! Storage layer error types
//!
//! All errors that can occur while reading repositories are defined here.
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::{InvalidNameError, RepositoryId};

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// the directory exists but holds no git data
    #[error("repository does not exist: {0}")]
    RepositoryNotExists(PathBuf),

    /// the path given for a repository is missing entirely
    #[error("repository path not found: {0}")]
    PathNotFound(PathBuf),

    /// a repository with this identifier is already in the pool
    #[error("duplicate repository identifier: {0}")]
    DuplicateRepository(RepositoryId),

    /// the pool has no repository with this identifier
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// invalid repository identifier
    #[error("invalid repository id: {0}")]
    InvalidRepositoryId(#[from] InvalidNameError),

    /// HEAD points at a branch with no commits yet
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// the revision resolved to nothing usable
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// the path does not name a blob in the commit's tree
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// blame cannot be computed for this kind of file
    #[error("unsupported file {path}: {reason}")]
    UnsupportedFile { path: String, reason: String },

    /// data integrity check failed
    #[error("corrupted data at {path}: {reason}")]
    CorruptedData { path: PathBuf, reason: String },

    /// internal error that shouldn't happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// check if this error stands for a state the checksum treats as empty
    /// rather than a failure
    pub fn is_tolerated(&self) -> bool {
        matches!(
            self,
            StorageError::RepositoryNotExists(_) | StorageError::RefNotFound(_)
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
