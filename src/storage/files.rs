//! Lazy iteration over the files of a commit.
//!
//! libgit2 only offers callback-style tree walks, which would force the whole
//! listing into memory before the first file is used. `CommitFiles` keeps an
//! explicit stack instead: one directory listing per depth level, expanded
//! only when the walk reaches it.

use git2::{ObjectType, Oid};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::repository::GitRepository;
use crate::storage::types::{BlobId, CommitId};

/// A file in a commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// `/`-separated path from the tree root
    pub path: String,
    pub blob: BlobId,
}

/// Pull-based source of files.
///
/// `close` releases whatever the iterator holds; after it, `next_file`
/// yields `None`.
pub trait FileIterator: Send {
    /// Get the next file, or None if exhausted.
    fn next_file(&mut self) -> StorageResult<Option<File>>;

    /// Release held resources.
    fn close(&mut self);
}

struct TreeEntry {
    name: String,
    oid: Oid,
    kind: Option<ObjectType>,
}

struct TreeFrame {
    prefix: String,
    entries: std::vec::IntoIter<TreeEntry>,
}

/// Depth-first, pre-order walk over a commit's tree.
pub struct CommitFiles {
    repo: GitRepository,
    stack: Vec<TreeFrame>,
    closed: bool,
}

impl CommitFiles {
    pub(crate) fn new(repo: GitRepository, commit: CommitId) -> StorageResult<Self> {
        let root = repo.with_repo(|r| {
            let commit = r
                .find_commit(commit.raw())
                .map_err(|_| StorageError::CommitNotFound(commit.to_string()))?;
            Ok(commit.tree_id())
        })?;

        let frame = Self::load_frame(&repo, root, String::new())?;
        Ok(Self {
            repo,
            stack: vec![frame],
            closed: false,
        })
    }

    fn load_frame(repo: &GitRepository, tree: Oid, prefix: String) -> StorageResult<TreeFrame> {
        let entries = repo.with_repo(|r| {
            let tree = r.find_tree(tree)?;
            Ok(tree
                .iter()
                .map(|entry| TreeEntry {
                    name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                    oid: entry.id(),
                    kind: entry.kind(),
                })
                .collect::<Vec<_>>())
        })?;

        Ok(TreeFrame {
            prefix,
            entries: entries.into_iter(),
        })
    }
}

impl FileIterator for CommitFiles {
    fn next_file(&mut self) -> StorageResult<Option<File>> {
        if self.closed {
            return Ok(None);
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };

            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };

            let path = if frame.prefix.is_empty() {
                entry.name
            } else {
                format!("{}/{}", frame.prefix, entry.name)
            };

            match entry.kind {
                Some(ObjectType::Tree) => {
                    let frame = Self::load_frame(&self.repo, entry.oid, path)?;
                    self.stack.push(frame);
                }
                Some(ObjectType::Blob) => {
                    return Ok(Some(File {
                        path,
                        blob: BlobId::new(entry.oid),
                    }));
                }
                // submodule commits have no content here
                _ => continue,
            }
        }
    }

    fn close(&mut self) {
        self.stack.clear();
        self.closed = true;
    }
}
