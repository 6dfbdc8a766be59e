//! Pool configuration.

use std::path::PathBuf;

use crate::storage::RepositoryId;

/// One configured repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    /// Explicit identifier; derived from the path when absent.
    pub id: Option<RepositoryId>,
    /// Repository directory.
    pub path: PathBuf,
}

/// Configuration for building a `RepositoryPool`.
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Repositories, in pool order.
    pub repositories: Vec<RepositoryEntry>,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl PoolConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a repository whose id comes from its directory name.
    pub fn repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.repositories.push(RepositoryEntry {
            id: None,
            path: path.into(),
        });
        self
    }

    /// Append a repository with an explicit id.
    pub fn repository_with_id(mut self, id: RepositoryId, path: impl Into<PathBuf>) -> Self {
        self.repositories.push(RepositoryEntry {
            id: Some(id),
            path: path.into(),
        });
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Log filter directive matching the verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
