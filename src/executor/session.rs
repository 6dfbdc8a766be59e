//! Per-query session state.
//!
//! A `Session` is built once per query and passed explicitly into every
//! expression evaluation. It carries the repository pool and collects the
//! warnings that non-fatal failures leave behind.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::pool::RepositoryPool;

/// A warning recorded while evaluating a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: u16,
    pub message: String,
}

/// Execution context for one query.
pub struct Session {
    pool: Arc<RepositoryPool>,
    warnings: Mutex<Vec<Warning>>,
}

impl Session {
    /// Create a session over `pool`.
    pub fn new(pool: Arc<RepositoryPool>) -> Self {
        Self {
            pool,
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// The repositories this session queries.
    pub fn pool(&self) -> &RepositoryPool {
        &self.pool
    }

    /// Record a warning.
    pub fn warn(&self, code: u16, message: impl Into<String>) {
        self.warnings.lock().push(Warning {
            code,
            message: message.into(),
        });
    }

    /// Snapshot of recorded warnings, oldest first.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.lock().len()
    }

    /// Drop recorded warnings, returning them.
    pub fn take_warnings(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.lock())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("repositories", &self.pool.len())
            .field("warnings", &self.warning_count())
            .finish()
    }
}
