//! repolens - fingerprints and line attribution for pools of git repositories
//!
//! A `RepositoryPool` holds named repositories in a fixed order. From it the
//! crate computes a content fingerprint that changes whenever any packfile or
//! reference changes, and evaluates `blame(repository_id, revision)`, which
//! streams one record per line of every file in a commit.
//!
//! # Example
//!
//! ```no_run
//! use repolens::pool::RepositoryPool;
//!
//! let mut pool = RepositoryPool::new();
//! pool.add_path("./linux").unwrap();
//! pool.add_path("./git").unwrap();
//! println!("{}", pool.checksum().unwrap());
//! ```

pub mod checksum;
pub mod config;
pub mod executor;
pub mod pool;
pub mod storage;
