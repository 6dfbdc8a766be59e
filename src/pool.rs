//! Ordered collection of repositories.
//!
//! Iteration order is insertion order and the fingerprint depends on it, so
//! the pool is backed by an `IndexMap` rather than a hash map.

use std::path::Path;

use indexmap::IndexMap;

use crate::checksum::Checksummer;
use crate::config::PoolConfig;
use crate::storage::{GitRepository, RepositoryId, StorageError, StorageResult};

/// Repositories keyed by identifier, in the order they were added.
#[derive(Debug, Default)]
pub struct RepositoryPool {
    repositories: IndexMap<RepositoryId, GitRepository>,
}

impl RepositoryPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every repository listed in `config`, in order.
    pub fn from_config(config: &PoolConfig) -> StorageResult<Self> {
        let mut pool = Self::new();
        for entry in &config.repositories {
            match &entry.id {
                Some(id) => pool.add_path_with_id(id.clone(), &entry.path)?,
                None => {
                    pool.add_path(&entry.path)?;
                }
            }
        }
        Ok(pool)
    }

    /// Register a handle under `id`.
    ///
    /// Fails if the identifier is already taken.
    pub fn add(&mut self, id: RepositoryId, repo: GitRepository) -> StorageResult<()> {
        if self.repositories.contains_key(&id) {
            return Err(StorageError::DuplicateRepository(id));
        }

        tracing::debug!(id = %id, path = %repo.path().display(), "repository added to pool");
        self.repositories.insert(id, repo);
        Ok(())
    }

    /// Open `path` and register it under an id derived from its directory name.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> StorageResult<RepositoryId> {
        let path = path.as_ref();
        let id = RepositoryId::from_path(path)?;
        self.add_path_with_id(id.clone(), path)?;
        Ok(id)
    }

    /// Open `path` and register it under `id`.
    pub fn add_path_with_id(&mut self, id: RepositoryId, path: impl AsRef<Path>) -> StorageResult<()> {
        if self.repositories.contains_key(&id) {
            return Err(StorageError::DuplicateRepository(id));
        }
        let repo = GitRepository::open(path)?;
        self.add(id, repo)
    }

    /// Look up a repository.
    pub fn get(&self, id: &str) -> StorageResult<&GitRepository> {
        self.repositories
            .get(id)
            .ok_or_else(|| StorageError::RepositoryNotFound(id.to_string()))
    }

    /// Check whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.repositories.contains_key(id)
    }

    /// Repositories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&RepositoryId, &GitRepository)> {
        self.repositories.iter()
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &RepositoryId> {
        self.repositories.keys()
    }

    /// Number of repositories.
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Fingerprint of every repository's packs and references.
    pub fn checksum(&self) -> StorageResult<String> {
        Checksummer::new(self).checksum()
    }
}
