//! Reference state and revision resolution.
//!
//! Git refs are pointers to commits. This module handles:
//! - HEAD resolution, tolerating repositories with no commits yet
//! - Serializing every reference into the bytes the pool fingerprint hashes
//! - Resolving revision strings (`HEAD~2`, branch names, hashes) to commits

use git2::{ErrorCode, Oid, Repository};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::CommitId;

/// Name written for HEAD in the reference state.
const HEAD: &str = "HEAD";

/// Reads references out of a `git2::Repository`.
pub struct RefManager;

impl RefManager {
    /// Target of HEAD.
    ///
    /// An unborn branch or a missing HEAD is `RefNotFound`.
    pub fn head_target(repo: &Repository) -> StorageResult<Oid> {
        let head = repo.head().map_err(|e| match e.code() {
            ErrorCode::UnbornBranch | ErrorCode::NotFound => StorageError::RefNotFound(HEAD.to_string()),
            _ => StorageError::Git(e),
        })?;

        head.target()
            .ok_or_else(|| StorageError::RefNotFound(HEAD.to_string()))
    }

    /// Get the current HEAD commit.
    pub fn head_commit(repo: &Repository) -> StorageResult<CommitId> {
        let target = Self::head_target(repo)?;
        let commit = repo.find_commit(target)?;
        Ok(CommitId::new(commit.id()))
    }

    /// Bytes describing HEAD and every reference.
    ///
    /// HEAD comes first as `HEAD<hex>` when it resolves, followed by
    /// `<name><hex>` for each reference in iterator order. Symbolic references
    /// contribute the zero hash.
    pub fn reference_state(repo: &Repository) -> StorageResult<Vec<u8>> {
        let mut buf = Vec::new();

        match Self::head_target(repo) {
            Ok(target) => {
                buf.extend_from_slice(HEAD.as_bytes());
                buf.extend_from_slice(target.to_string().as_bytes());
            }
            Err(e) if e.is_tolerated() => {}
            Err(e) => return Err(e),
        }

        for reference in repo.references()? {
            let reference = reference?;
            let target = reference.target().unwrap_or_else(Oid::zero);
            buf.extend_from_slice(reference.name_bytes());
            buf.extend_from_slice(target.to_string().as_bytes());
        }

        Ok(buf)
    }

    /// Resolve a revision to a commit.
    ///
    /// Revision expressions are tried first. If they fail the string is taken
    /// as a literal hash, which is only checked by the commit lookup.
    pub fn resolve_commit(repo: &Repository, revision: &str) -> StorageResult<CommitId> {
        let not_found = || StorageError::CommitNotFound(revision.to_string());

        let oid = match repo.revparse_single(revision).and_then(|o| o.peel_to_commit()) {
            Ok(commit) => commit.id(),
            Err(_) => Oid::from_str(revision).map_err(|_| not_found())?,
        };

        let commit = repo.find_commit(oid).map_err(|_| not_found())?;
        Ok(CommitId::new(commit.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures;

    #[test]
    fn test_head_commit() {
        let (_dir, repo) = fixtures::init_repo();
        let expected = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);
        assert_eq!(RefManager::head_commit(&repo).unwrap().raw(), expected);
    }

    #[test]
    fn test_unborn_head_is_tolerated() {
        let (_dir, repo) = fixtures::init_repo();

        let result = RefManager::head_target(&repo);
        assert!(matches!(result, Err(StorageError::RefNotFound(_))));

        // no HEAD bytes and no references
        assert!(RefManager::reference_state(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_reference_state_layout() {
        let (_dir, repo) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);

        let state = String::from_utf8(RefManager::reference_state(&repo).unwrap()).unwrap();
        let branch = repo.head().unwrap().name().unwrap().to_string();

        assert!(state.starts_with(&format!("HEAD{}", head)));
        assert!(state.contains(&format!("{}{}", branch, head)));
    }

    #[test]
    fn test_reference_state_tracks_new_refs() {
        let (_dir, repo) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);

        let before = RefManager::reference_state(&repo).unwrap();

        let commit = repo.find_commit(head).unwrap();
        repo.branch("feature", &commit, false).unwrap();
        let with_branch = RefManager::reference_state(&repo).unwrap();
        assert_ne!(before, with_branch);

        repo.find_branch("feature", git2::BranchType::Local)
            .unwrap()
            .delete()
            .unwrap();
        assert_eq!(RefManager::reference_state(&repo).unwrap(), before);
    }

    #[test]
    fn test_resolve_commit_literal_hash_fallback() {
        let (_dir, repo) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);

        let resolved = RefManager::resolve_commit(&repo, &head.to_string()).unwrap();
        assert_eq!(resolved.raw(), head);

        // well-formed hash, no such object
        let result = RefManager::resolve_commit(&repo, "1111111111111111111111111111111111111111");
        assert!(matches!(result, Err(StorageError::CommitNotFound(_))));

        // not hex at all
        let result = RefManager::resolve_commit(&repo, "not a revision");
        assert!(matches!(result, Err(StorageError::CommitNotFound(_))));
    }

    #[test]
    fn test_resolve_commit_peels_tags() {
        let (_dir, repo) = fixtures::init_repo();
        let head = fixtures::commit_files(&repo, &[("a.txt", "a\n")], "init", fixtures::ALICE);

        let object = repo.find_object(head, None).unwrap();
        let sig = git2::Signature::now("Tagger", "tagger@example.com").unwrap();
        repo.tag("v1.0", &object, &sig, "release", false).unwrap();

        let resolved = RefManager::resolve_commit(&repo, "v1.0").unwrap();
        assert_eq!(resolved.raw(), head);
    }
}
