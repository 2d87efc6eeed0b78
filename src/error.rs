//! Errors that abort a search run.
//!
//! Rejected candidates are never errors; they are counted in the worker
//! statistics instead.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::numeric::ReductionError;
use crate::report::ParseError;

#[derive(Debug)]
pub enum SearchError {
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// The output file cannot be created or written.
    Output { path: PathBuf, source: io::Error },
    /// The lattice reduction backend failed inside a worker.
    Numeric {
        worker_id: usize,
        multiplier: u64,
        source: ReductionError,
    },
    /// A worker panicked or stopped with a fatal error.
    WorkerFailed { worker_id: usize, message: String },
    /// A candidates file could not be parsed.
    Parse(ParseError),
    Io(io::Error),
}

impl SearchError {
    /// Worker that caused the failure, if any.
    pub fn worker_id(&self) -> Option<usize> {
        match self {
            SearchError::Numeric { worker_id, .. }
            | SearchError::WorkerFailed { worker_id, .. } => Some(*worker_id),
            _ => None,
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidConfig(message) => write!(f, "invalid configuration: {}", message),
            SearchError::Output { path, source } => {
                write!(f, "cannot write output {}: {}", path.display(), source)
            }
            SearchError::Numeric {
                worker_id,
                multiplier,
                source,
            } => write!(
                f,
                "worker {} failed scoring multiplier {:x}: {}",
                worker_id, multiplier, source
            ),
            SearchError::WorkerFailed { worker_id, message } => {
                write!(f, "worker {} failed: {}", worker_id, message)
            }
            SearchError::Parse(e) => write!(f, "{}", e),
            SearchError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Output { source, .. } => Some(source),
            SearchError::Numeric { source, .. } => Some(source),
            SearchError::Parse(e) => Some(e),
            SearchError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SearchError {
    fn from(e: io::Error) -> Self {
        SearchError::Io(e)
    }
}

impl From<ParseError> for SearchError {
    fn from(e: ParseError) -> Self {
        SearchError::Parse(e)
    }
}
