//! `blame(repository_id, revision)`.
//!
//! Evaluates to a generator yielding one JSON object per line of every file
//! in the commit's tree:
//!
//! ```text
//! {"file": "src/lib.rs", "linenum": 0, "author": "alice@example.com", "text": "..."}
//! ```
//!
//! libgit2 blames a whole file at once; the generator holds one file's lines
//! at a time and hands them out one per pull.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::executor::error::{ExecuteError, ExecuteResult};
use crate::executor::eval::{check_arity, eval_to_string, Datum, Expression};
use crate::executor::generator::Generator;
use crate::executor::operators::Row;
use crate::executor::session::Session;
use crate::executor::types::DataType;
use crate::storage::{BlameSource, CommitId, File, FileIterator, Line};

/// One attributed line of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameLine {
    pub file: String,
    /// zero-based, restarts at every file
    #[serde(rename = "linenum")]
    pub line_num: usize,
    pub author: String,
    pub text: String,
}

enum State {
    Unstarted,
    InFile {
        file: File,
        lines: std::vec::IntoIter<Line>,
        next_index: usize,
    },
    Exhausted,
}

/// Streams blame output for every file of one commit.
///
/// Files whose blame fails are skipped with a warning; files with no lines
/// are skipped silently. The file iterator is closed exactly once: on
/// exhaustion, on `close`, or on drop.
pub struct BlameGenerator {
    session: Arc<Session>,
    source: Arc<dyn BlameSource>,
    commit: CommitId,
    files: Box<dyn FileIterator>,
    state: State,
    closed: bool,
}

impl BlameGenerator {
    pub fn new(
        session: Arc<Session>,
        source: Arc<dyn BlameSource>,
        commit: CommitId,
        files: Box<dyn FileIterator>,
    ) -> Self {
        Self {
            session,
            source,
            commit,
            files,
            state: State::Unstarted,
            closed: false,
        }
    }

    /// Next attributed line, or None once every file is consumed.
    pub fn next_line(&mut self) -> ExecuteResult<Option<BlameLine>> {
        loop {
            match &mut self.state {
                State::Exhausted => return Ok(None),
                State::InFile { file, lines, next_index } => {
                    if let Some(line) = lines.next() {
                        let out = BlameLine {
                            file: file.path.clone(),
                            line_num: *next_index,
                            author: line.author,
                            text: line.text,
                        };
                        *next_index += 1;
                        return Ok(Some(out));
                    }
                }
                State::Unstarted => {}
            }

            self.load_next_file()?;
        }
    }

    /// Advance to the next file with at least one blamed line.
    fn load_next_file(&mut self) -> ExecuteResult<()> {
        loop {
            let Some(file) = self.files.next_file()? else {
                self.state = State::Exhausted;
                self.release();
                return Ok(());
            };

            tracing::debug!(file = %file.path, blob = %file.blob, "blame: loading file");
            match self.source.blame(self.commit, &file.path) {
                Ok(result) if result.lines.is_empty() => {
                    tracing::debug!(file = %file.path, "blame: no lines, skipping");
                }
                Ok(result) => {
                    self.state = State::InFile {
                        file,
                        lines: result.lines.into_iter(),
                        next_index: 0,
                    };
                    return Ok(());
                }
                Err(e) => {
                    let message = format!("error in blame for file {}: {}", file.path, e);
                    tracing::warn!(file = %file.path, commit = %self.commit, error = %e, "blame: skipping file");
                    self.session.warn(0, message);
                }
            }
        }
    }

    fn release(&mut self) {
        if !self.closed {
            self.files.close();
            self.closed = true;
        }
    }
}

impl Generator for BlameGenerator {
    fn next_value(&mut self) -> ExecuteResult<Option<Value>> {
        match self.next_line()? {
            Some(line) => Ok(Some(serde_json::to_value(line)?)),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> ExecuteResult<()> {
        self.state = State::Exhausted;
        self.release();
        Ok(())
    }
}

impl Drop for BlameGenerator {
    fn drop(&mut self) {
        self.release();
    }
}

/// The `blame(repository_id, revision)` expression.
pub struct Blame {
    repo: Arc<dyn Expression>,
    revision: Arc<dyn Expression>,
}

impl Blame {
    pub const NAME: &'static str = "blame";

    pub fn new(repo: Arc<dyn Expression>, revision: Arc<dyn Expression>) -> Arc<dyn Expression> {
        Arc::new(Self { repo, revision })
    }
}

impl fmt::Display for Blame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", Self::NAME, self.repo, self.revision)
    }
}

impl Expression for Blame {
    fn children(&self) -> Vec<Arc<dyn Expression>> {
        vec![self.repo.clone(), self.revision.clone()]
    }

    fn with_children(&self, children: Vec<Arc<dyn Expression>>) -> ExecuteResult<Arc<dyn Expression>> {
        check_arity(self, &children, 2)?;
        let [repo, revision] = <[Arc<dyn Expression>; 2]>::try_from(children)
            .map_err(|_| ExecuteError::Internal("blame: operand count changed".to_string()))?;
        Ok(Blame::new(repo, revision))
    }

    fn is_nullable(&self) -> bool {
        self.repo.is_nullable() || self.revision.is_nullable()
    }

    fn resolved(&self) -> bool {
        self.repo.resolved() && self.revision.resolved()
    }

    fn data_type(&self) -> DataType {
        DataType::Array(Box::new(DataType::Json))
    }

    /// Unresolvable repositories and revisions are not errors: the row gets
    /// NULL and the session gets a warning.
    fn eval(&self, session: &Arc<Session>, row: &Row) -> ExecuteResult<Datum> {
        let _span = tracing::debug_span!("blame").entered();

        let Some(id) = eval_to_string(self.repo.as_ref(), session, row)? else {
            return Ok(Datum::Null);
        };
        let Some(revision) = eval_to_string(self.revision.as_ref(), session, row)? else {
            return Ok(Datum::Null);
        };

        let repo = match session.pool().get(&id) {
            Ok(repo) => repo.clone(),
            Err(e) => {
                tracing::warn!(repository = %id, error = %e, "blame: repository not resolved");
                session.warn(0, e.to_string());
                return Ok(Datum::Null);
            }
        };

        let commit = match repo.resolve_commit(&revision) {
            Ok(commit) => commit,
            Err(e) => {
                tracing::warn!(repository = %id, revision = %revision, error = %e, "blame: commit not resolved");
                session.warn(0, e.to_string());
                return Ok(Datum::Null);
            }
        };

        let files = repo.files(commit)?;
        tracing::debug!(repo = %repo.path().display(), commit = %commit.short(), "blame: generator created");

        let generator = BlameGenerator::new(session.clone(), Arc::new(repo), commit, Box::new(files));
        Ok(Datum::Generator(Box::new(generator)))
    }
}
