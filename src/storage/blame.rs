//! Per-file line attribution.
//!
//! libgit2 computes a whole file's blame in one call. This module wraps that
//! call and pairs each hunk with the literal text of its lines so callers get
//! one `Line` per line of the file.

use std::path::Path;

use git2::{BlameOptions, Repository};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::repository::GitRepository;
use crate::storage::types::CommitId;

/// One attributed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// email of the author who last touched the line
    pub author: String,
    pub text: String,
}

/// Blame of a whole file, in line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameResult {
    pub path: String,
    pub lines: Vec<Line>,
}

/// Something that can blame a file as of a commit.
pub trait BlameSource: Send + Sync {
    fn blame(&self, commit: CommitId, path: &str) -> StorageResult<BlameResult>;
}

impl BlameSource for GitRepository {
    fn blame(&self, commit: CommitId, path: &str) -> StorageResult<BlameResult> {
        self.with_repo(|repo| blame_file(repo, commit, path))
    }
}

/// Blame `path` as it exists in `commit`.
///
/// Binary blobs are rejected. Text is split on `\n` with no trailing empty
/// line, so an empty file has no lines.
pub fn blame_file(repo: &Repository, commit: CommitId, path: &str) -> StorageResult<BlameResult> {
    let tree = repo
        .find_commit(commit.raw())
        .map_err(|_| StorageError::CommitNotFound(commit.to_string()))?
        .tree()?;

    let entry = tree
        .get_path(Path::new(path))
        .map_err(|_| StorageError::FileNotFound(path.to_string()))?;

    let blob = repo
        .find_blob(entry.id())
        .map_err(|_| StorageError::UnsupportedFile {
            path: path.to_string(),
            reason: "not a blob".to_string(),
        })?;

    if blob.is_binary() {
        return Err(StorageError::UnsupportedFile {
            path: path.to_string(),
            reason: "binary content".to_string(),
        });
    }

    let content = String::from_utf8_lossy(blob.content());
    let texts: Vec<&str> = content.split_terminator('\n').collect();
    if texts.is_empty() {
        return Ok(BlameResult {
            path: path.to_string(),
            lines: Vec::new(),
        });
    }

    let mut opts = BlameOptions::new();
    opts.newest_commit(commit.raw());
    let blame = repo.blame_file(Path::new(path), Some(&mut opts))?;

    let lines = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let hunk = blame.get_line(i + 1).ok_or_else(|| {
                StorageError::Internal(format!("no blame hunk for {}:{}", path, i + 1))
            })?;
            let signature = hunk.final_signature();
            Ok(Line {
                author: signature.email().unwrap_or_default().to_string(),
                text: (*text).to_string(),
            })
        })
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(BlameResult {
        path: path.to_string(),
        lines,
    })
}
