//! Fingerprint of a repository pool.
//!
//! The fingerprint is used as a cache key: when it changes, cached query
//! results and derived indexes over the pool are stale. It hashes, for each
//! repository in pool order:
//!
//! ```text
//! id bytes | pack trailer 1 | pack trailer 2 | ... | HEAD<hex> | <ref><hex> | ...
//! ```
//!
//! The digest is SHA-1 and the encoding is padded standard base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

use crate::pool::RepositoryPool;
use crate::storage::StorageResult;

/// Computes the fingerprint of a pool. Holds no state between calls.
pub struct Checksummer<'a> {
    pool: &'a RepositoryPool,
}

impl<'a> Checksummer<'a> {
    pub fn new(pool: &'a RepositoryPool) -> Self {
        Self { pool }
    }

    /// Hash every repository's packs and references.
    ///
    /// Any I/O failure aborts the whole computation. A repository without git
    /// data contributes only its identifier, and an unborn HEAD contributes
    /// nothing.
    pub fn checksum(&self) -> StorageResult<String> {
        let mut hasher = Sha1::new();

        for (id, repo) in self.pool.iter() {
            hasher.update(id.as_bytes());

            let packs = repo.pack_checksums()?;
            hasher.update(&packs);

            let refs = repo.reference_state()?;
            hasher.update(&refs);

            tracing::debug!(
                id = %id,
                packfiles = packs.len() / crate::storage::pack::PACK_TRAILER_LEN,
                ref_bytes = refs.len(),
                "repository checksummed"
            );
        }

        Ok(STANDARD.encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{fixtures, GitRepository, RepositoryId, StorageError};
    use std::path::Path;
    use tempfile::TempDir;

    fn digest(parts: &[&[u8]]) -> String {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }
        STANDARD.encode(hasher.finalize())
    }

    fn pool_of(entries: &[(&str, &Path)]) -> RepositoryPool {
        let mut pool = RepositoryPool::new();
        for (id, path) in entries {
            pool.add(RepositoryId::new(*id).unwrap(), GitRepository::open(path).unwrap())
                .unwrap();
        }
        pool
    }

    #[test]
    fn test_empty_pool() {
        let pool = RepositoryPool::new();
        assert_eq!(pool.checksum().unwrap(), "2jmj7l5rSw0yVb/vlWAYkK/YBwk=");
    }

    #[test]
    fn test_repository_without_git_data_contributes_only_its_id() {
        let dir = TempDir::new().unwrap();
        let pool = pool_of(&[("empty", dir.path())]);

        assert_eq!(pool.checksum().unwrap(), digest(&[b"empty".as_slice()]));
    }

    #[test]
    fn test_unborn_head_contributes_nothing() {
        let (dir, _repo) = fixtures::init_repo();
        let pool = pool_of(&[("fresh", dir.path())]);

        assert_eq!(pool.checksum().unwrap(), digest(&[b"fresh".as_slice()]));
    }

    #[test]
    fn test_deterministic_across_pools() {
        let (dir_a, repo_a) = fixtures::init_repo();
        let (dir_b, repo_b) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo_a, &[("a.txt", "a\n")], "init", fixtures::ALICE);
        fixtures::write_pack(&repo_a, head);
        fixtures::commit_files(&repo_b, &[("b.txt", "b\n")], "init", fixtures::BOB);

        let first = pool_of(&[("a", dir_a.path()), ("b", dir_b.path())]).checksum().unwrap();
        let second = pool_of(&[("a", dir_a.path()), ("b", dir_b.path())]).checksum().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_insertion_order_matters() {
        let (dir_a, repo_a) = fixtures::init_repo();
        let (dir_b, repo_b) = fixtures::init_repo();
        fixtures::commit_files(&repo_a, &[("a.txt", "a\n")], "init", fixtures::ALICE);
        fixtures::commit_files(&repo_b, &[("b.txt", "b\n")], "init", fixtures::BOB);

        let forward = pool_of(&[("a", dir_a.path()), ("b", dir_b.path())]).checksum().unwrap();
        let reverse = pool_of(&[("b", dir_b.path()), ("a", dir_a.path())]).checksum().unwrap();
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_reference_changes_are_detected_and_revert() {
        let (dir, repo) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);
        let pool = pool_of(&[("repo", dir.path())]);

        let original = pool.checksum().unwrap();

        let commit = repo.find_commit(head).unwrap();
        repo.branch("feature", &commit, false).unwrap();
        let changed = pool.checksum().unwrap();
        assert_ne!(original, changed);

        repo.find_branch("feature", git2::BranchType::Local)
            .unwrap()
            .delete()
            .unwrap();
        assert_eq!(pool.checksum().unwrap(), original);
    }

    #[test]
    fn test_pack_trailers_are_hashed() {
        let (dir, repo) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);
        let pool = pool_of(&[("repo", dir.path())]);

        let without_pack = pool.checksum().unwrap();
        let trailer = fixtures::write_pack(&repo, head);
        let with_pack = pool.checksum().unwrap();
        assert_ne!(without_pack, with_pack);

        let refs = pool.get("repo").unwrap().reference_state().unwrap();
        assert_eq!(with_pack, digest(&[b"repo".as_slice(), trailer.as_slice(), refs.as_slice()]));
    }

    #[test]
    fn test_corrupt_pack_aborts() {
        let (dir, repo) = fixtures::init_repo();
        fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);

        let pack_dir = repo.path().join("objects").join("pack");
        std::fs::create_dir_all(&pack_dir).unwrap();
        std::fs::write(pack_dir.join(format!("pack-{}.pack", "0".repeat(40))), b"PACK").unwrap();

        let pool = pool_of(&[("repo", dir.path())]);
        assert!(matches!(pool.checksum(), Err(StorageError::CorruptedData { .. })));
    }
}
