//! Error types for turbowalk.

use std::io;
use thiserror::Error;

/// Error type for enumeration and walk operations.
///
/// Only fatal errors ever reach the caller of a walk. `Open` and `Syscall`
/// are produced by [`BulkEnumerator`](crate::BulkEnumerator) and are
/// swallowed by the walker, which treats the directory as empty.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open a directory.
    #[error("failed to open directory: {0}")]
    Open(#[source] io::Error),

    /// The bulk enumeration call failed part way through a directory.
    #[error("bulk directory enumeration failed: {0}")]
    Syscall(#[source] io::Error),

    /// The bulk buffer contained a malformed record.
    #[error("buffer parse error: {0}")]
    Parse(String),

    /// A required OS entry point could not be resolved.
    #[error("unable to resolve `{symbol}`")]
    EntryPoint {
        /// Name of the missing symbol.
        symbol: &'static str,
    },

    /// The worker thread could not be started.
    #[error("failed to spawn walk worker: {0}")]
    Spawn(#[source] io::Error),

    /// A batch callback or the engine panicked on the worker.
    #[error("walk worker panicked: {0}")]
    Panicked(String),
}

impl Error {
    /// Whether this error ends the walk.
    ///
    /// Directory-level failures (`Open`, `Syscall`) are not fatal: the
    /// directory is treated as having no children.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Open(_) | Error::Syscall(_))
    }
}

/// Internal parse error type.
#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum ParseError {
    /// A record extends past the valid part of the buffer.
    #[error("record extends past end of buffer")]
    BufferTooSmall,
    /// Invalid offset in a variable-length attribute reference.
    #[error("invalid offset in attribute reference")]
    InvalidOffset,
    /// Unexpected end of buffer.
    #[error("unexpected end of buffer")]
    UnexpectedEnd,
    /// Record length is zero or too short to hold a header.
    #[error("invalid record length")]
    InvalidRecordLength,
    /// Name bytes are not NUL terminated within the record.
    #[error("unterminated name")]
    UnterminatedName,
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e.to_string())
    }
}
