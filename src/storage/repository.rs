//! Core Git repository handle.
//!
//! A `GitRepository` wraps one on-disk repository directory. It always knows
//! where the repository's pack storage lives, and it may or may not hold a
//! loaded `git2::Repository`: a directory without git data is a valid handle
//! that simply has no refs and no commits.
//!
//! All other storage modules go through this for Git access.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{ErrorCode, Repository};
use parking_lot::Mutex;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::files::CommitFiles;
use crate::storage::pack;
use crate::storage::refs::RefManager;
use crate::storage::types::CommitId;

/// Handle to one repository directory.
///
/// Clone this to share across threads - it uses Arc internally.
#[derive(Clone)]
pub struct GitRepository {
    inner: Arc<GitRepositoryInner>,
}

struct GitRepositoryInner {
    path: PathBuf,
    git_dir: PathBuf,
    /// shared object store; differs from `git_dir` for linked worktrees
    common_dir: PathBuf,
    repo: Option<Mutex<Repository>>,
}

impl GitRepository {
    /// Open a repository directory.
    ///
    /// A directory that exists but is not a git repository opens fine and
    /// reports `exists() == false`. Any other libgit2 failure is returned.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::PathNotFound(path.to_path_buf()));
        }

        let (git_dir, common_dir, repo) = match Repository::open(path) {
            Ok(repo) => {
                let git_dir = repo.path().to_path_buf();
                let common_dir = repo.commondir().to_path_buf();
                (git_dir, common_dir, Some(Mutex::new(repo)))
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                let dot_git = path.join(".git");
                let git_dir = if dot_git.is_dir() { dot_git } else { path.to_path_buf() };
                tracing::debug!(path = %path.display(), "no git data, opening as empty repository");
                (git_dir.clone(), git_dir, None)
            }
            Err(e) => return Err(StorageError::Git(e)),
        };

        Ok(Self {
            inner: Arc::new(GitRepositoryInner {
                path: path.to_path_buf(),
                git_dir,
                common_dir,
                repo,
            }),
        })
    }

    /// Get the repository path as given to `open`.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// The git directory (`.git` for worktrees, the root for bare repositories).
    pub fn git_dir(&self) -> &Path {
        &self.inner.git_dir
    }

    /// Directory holding the packfiles.
    ///
    /// Linked worktrees read the object store of the repository they were
    /// added from, so this is resolved against the common directory.
    pub fn pack_dir(&self) -> PathBuf {
        self.inner.common_dir.join("objects").join("pack")
    }

    /// Whether the directory holds git data.
    pub fn exists(&self) -> bool {
        self.inner.repo.is_some()
    }

    /// Execute a function with access to the loaded repository.
    ///
    /// Fails with `RepositoryNotExists` when the directory has no git data.
    pub fn with_repo<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Repository) -> StorageResult<T>,
    {
        let repo = self
            .inner
            .repo
            .as_ref()
            .ok_or_else(|| StorageError::RepositoryNotExists(self.inner.path.clone()))?;
        let guard = repo.lock();
        f(&guard)
    }

    // ==================== Fingerprint Inputs ====================

    /// Paths of every packfile, in the order they are fingerprinted.
    pub fn packfiles(&self) -> StorageResult<Vec<PathBuf>> {
        pack::list_packfiles(&self.pack_dir())
    }

    /// Trailing checksums of every packfile, concatenated.
    pub fn pack_checksums(&self) -> StorageResult<Vec<u8>> {
        pack::concat_trailers(&self.packfiles()?)
    }

    /// HEAD followed by every reference, as `name` + `hex target` pairs.
    ///
    /// A handle without git data yields no bytes.
    pub fn reference_state(&self) -> StorageResult<Vec<u8>> {
        match self.with_repo(RefManager::reference_state) {
            Err(StorageError::RepositoryNotExists(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    // ==================== Commit Access ====================

    /// Get the current HEAD commit.
    pub fn head(&self) -> StorageResult<CommitId> {
        self.with_repo(RefManager::head_commit)
    }

    /// Resolve a revision expression or literal hash to a commit.
    pub fn resolve_commit(&self, revision: &str) -> StorageResult<CommitId> {
        self.with_repo(|repo| RefManager::resolve_commit(repo, revision))
    }

    /// Lazily walk every file in a commit's tree.
    pub fn files(&self, commit: CommitId) -> StorageResult<CommitFiles> {
        CommitFiles::new(self.clone(), commit)
    }
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.inner.path)
            .field("git_dir", &self.inner.git_dir)
            .field("common_dir", &self.inner.common_dir)
            .field("exists", &self.exists())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_open_worktree_repository() {
        let (dir, raw) = fixtures::init_repo();
        let head = fixtures::commit_files(&raw, &[("a.txt", "a\n")], "first", fixtures::ALICE);

        let repo = GitRepository::open(dir.path()).unwrap();
        assert!(repo.exists());
        assert!(repo.git_dir().ends_with(".git"));
        assert_eq!(repo.pack_dir(), repo.git_dir().join("objects").join("pack"));
        assert_eq!(repo.head().unwrap().raw(), head);
    }

    #[test]
    fn test_open_bare_repository() {
        let dir = TempDir::new().unwrap();
        Repository::init_bare(dir.path()).unwrap();

        let repo = GitRepository::open(dir.path()).unwrap();
        assert!(repo.exists());
        assert_eq!(repo.git_dir().canonicalize().unwrap(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_open_plain_directory() {
        let dir = TempDir::new().unwrap();

        let repo = GitRepository::open(dir.path()).unwrap();
        assert!(!repo.exists());
        assert_eq!(repo.git_dir(), dir.path());
        assert!(matches!(repo.head(), Err(StorageError::RepositoryNotExists(_))));
        assert!(repo.reference_state().unwrap().is_empty());
        assert!(repo.pack_checksums().unwrap().is_empty());
    }

    #[test]
    fn test_linked_worktree_uses_shared_packs() {
        let (dir, raw) = fixtures::init_repo();
        let head = fixtures::commit_files(&raw, &[("a.txt", "a\n")], "first", fixtures::ALICE);
        let trailer = fixtures::write_pack(&raw, head);

        let wt_parent = TempDir::new().unwrap();
        let wt_path = wt_parent.path().join("wt");
        raw.worktree("wt", &wt_path, None).unwrap();

        let main = GitRepository::open(dir.path()).unwrap();
        let linked = GitRepository::open(&wt_path).unwrap();
        assert!(linked.exists());
        assert_ne!(
            linked.git_dir().canonicalize().unwrap(),
            main.git_dir().canonicalize().unwrap()
        );
        assert_eq!(
            linked.pack_dir().canonicalize().unwrap(),
            main.pack_dir().canonicalize().unwrap()
        );
        assert_eq!(linked.pack_checksums().unwrap(), trailer);
        assert_eq!(linked.packfiles().unwrap().len(), 1);
    }

    #[test]
    fn test_open_missing_path() {
        let dir = TempDir::new().unwrap();
        let result = GitRepository::open(dir.path().join("nope"));
        assert!(matches!(result, Err(StorageError::PathNotFound(_))));
    }

    #[test]
    fn test_resolve_commit() {
        let (dir, raw) = fixtures::init_repo();
        let first = fixtures::commit_files(&raw, &[("a.txt", "a\n")], "first", fixtures::ALICE);
        let second = fixtures::commit_files(&raw, &[("a.txt", "b\n")], "second", fixtures::BOB);

        let repo = GitRepository::open(dir.path()).unwrap();
        assert_eq!(repo.resolve_commit("HEAD").unwrap().raw(), second);
        assert_eq!(repo.resolve_commit("HEAD~1").unwrap().raw(), first);
        assert_eq!(repo.resolve_commit(&first.to_string()).unwrap().raw(), first);

        let missing = repo.resolve_commit("does-not-exist");
        assert!(matches!(missing, Err(StorageError::CommitNotFound(_))));
    }
}
