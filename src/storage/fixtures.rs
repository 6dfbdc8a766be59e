//! Test repositories built on the fly.

use std::fs;
use std::path::Path;

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

pub(crate) type Author = (&'static str, &'static str);

pub(crate) const ALICE: Author = ("Alice", "alice@example.com");
pub(crate) const BOB: Author = ("Bob", "bob@example.com");

/// Fresh non-bare repository with no commits.
pub(crate) fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Write `files` into the worktree and commit them on top of HEAD.
pub(crate) fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str, author: Author) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full = workdir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now(author.0, author.1).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
}

/// Pack every object reachable from `commit` and drop the pack into
/// `objects/pack`, named after its checksum as git does. Returns the
/// pack's trailing checksum.
///
/// No `.idx` is written, so libgit2 never tries to read the pack back.
pub(crate) fn write_pack(repo: &Repository, commit: Oid) -> Vec<u8> {
    let mut builder = repo.packbuilder().unwrap();
    builder.insert_commit(commit).unwrap();

    let mut buf = git2::Buf::new();
    builder.write_buf(&mut buf).unwrap();

    let pack_dir = repo.path().join("objects").join("pack");
    fs::create_dir_all(&pack_dir).unwrap();
    let bytes: &[u8] = &buf;
    let trailer = bytes[bytes.len() - 20..].to_vec();
    let hex: String = trailer.iter().map(|b| format!("{:02x}", b)).collect();
    fs::write(pack_dir.join(format!("pack-{}.pack", hex)), bytes).unwrap();

    trailer
}
