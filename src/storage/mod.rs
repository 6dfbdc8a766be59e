//! storage layer for repolens
//!
//! this module is the only place that talks to git2. The pool, the checksum
//! and the executor see repositories through `GitRepository` and the two
//! seams below, never through git2 types.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GitRepository                           │
//! │   (one repository directory, optional loaded git2 repo)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌──────────────┬──────┴───────┬──────────────┐
//!        │              │              │              │
//!        ▼              ▼              ▼              ▼
//!  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐
//!  │   pack    │  │   refs    │  │   files   │  │   blame   │
//!  │ (trailers)│  │ (HEAD,    │  │ (lazy tree│  │ (per-file │
//!  │           │  │  revs)    │  │   walk)   │  │  lines)   │
//!  └───────────┘  └───────────┘  └───────────┘  └───────────┘
//! ```
//!
//! `FileIterator` and `BlameSource` are traits so the blame generator can be
//! driven by anything that produces files and line attributions.

mod blame;
mod error;
mod files;
pub mod pack;
mod refs;
mod repository;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export public API
pub use blame::{blame_file, BlameResult, BlameSource, Line};
pub use error::{StorageError, StorageResult};
pub use files::{CommitFiles, File, FileIterator};
pub use refs::RefManager;
pub use repository::GitRepository;
pub use types::{BlobId, CommitId, InvalidNameError, RepositoryId};
