//! core type-safe wrappers around git primitives for the storage layer.

use std::borrow::Borrow;
use std::fmt;
use std::fmt::Formatter;
use std::path::Path;

use git2::Oid;
use serde::{Deserialize, Serialize};

/// This makes sure we don't accidentally pass a blob ID where a commit ID
/// is expected. The inner Oid is only accessible within the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitId(pub(crate) Oid);

impl CommitId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    /// raw Oid (for internal use only)
    pub(crate) fn raw(&self) -> Oid {
        self.0
    }

    /// parse CommitId from a hex string
    pub fn from_hex(hex: &str) -> Result<Self, git2::Error> {
        Oid::from_str(hex).map(CommitId)
    }

    /// short form of the commit ID
    pub fn short(&self) -> String {
        self.0.to_string()[..7].to_string()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Git blob identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobId(pub(crate) Oid);

impl BlobId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a repository inside a pool.
///
/// Identifiers are opaque to everything but the pool; the only rules are that
/// they are non-empty and free of NUL bytes, since they are fed verbatim into
/// the pool fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// create a new RepositoryId, validating the input
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidNameError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Derive an identifier from a repository path.
    ///
    /// The last path component is used with any `.git` suffix removed, so
    /// `/srv/repos/linux.git` and `/srv/repos/linux` both become `linux`.
    pub fn from_path(path: &Path) -> Result<Self, InvalidNameError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| InvalidNameError::InvalidPath(path.display().to_string()))?;

        let name = match name.strip_suffix(".git") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => name,
        };

        Self::new(name)
    }

    fn validate(id: &str) -> Result<(), InvalidNameError> {
        if id.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if let Some(position) = id.find('\0') {
            return Err(InvalidNameError::InvalidCharacter { char: '\0', position });
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// raw bytes, as fed into the fingerprint
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// keyed lookups by &str; Hash and Eq agree with String's
impl Borrow<str> for RepositoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RepositoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error type for invalid names (repository ids)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    InvalidCharacter { char: char, position: usize },
    InvalidPath(String),
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
            Self::InvalidPath(path) => write!(f, "invalid path: '{}'", path),
        }
    }
}

impl std::error::Error for InvalidNameError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_repository_id_valid() {
        assert!(RepositoryId::new("linux").is_ok());
        assert!(RepositoryId::new("github.com/src-d/gitbase").is_ok());
        assert!(RepositoryId::new("with space").is_ok());
    }

    #[test]
    fn test_repository_id_invalid() {
        assert_eq!(RepositoryId::new(""), Err(InvalidNameError::Empty));
        assert!(matches!(
            RepositoryId::new("a\0b"),
            Err(InvalidNameError::InvalidCharacter { position: 1, .. })
        ));
    }

    #[test]
    fn test_repository_id_from_path() {
        let id = RepositoryId::from_path(&PathBuf::from("/srv/repos/linux.git")).unwrap();
        assert_eq!(id.as_str(), "linux");

        let id = RepositoryId::from_path(&PathBuf::from("/srv/repos/linux")).unwrap();
        assert_eq!(id.as_str(), "linux");

        // a bare ".git" keeps its name instead of becoming empty
        let id = RepositoryId::from_path(&PathBuf::from("/srv/.git")).unwrap();
        assert_eq!(id.as_str(), ".git");

        assert!(RepositoryId::from_path(&PathBuf::from("/")).is_err());
    }

    #[test]
    fn test_commit_id_short() {
        let id = CommitId::from_hex("0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(id.short(), "0123456");
        assert_eq!(id.to_string().len(), 40);
    }
}
