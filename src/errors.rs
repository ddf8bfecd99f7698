// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Every failure the wrapper can report is a variant of [`ExexError`], so
//! callers match on one enum instead of probing concrete types at runtime.
//! The payload structs ([`ExitError`], [`LookupError`], [`AnnotatedError`])
//! carry the data that makes each failure actionable.

use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExexError {
    /// The process could not be started at all.
    #[error("failed to start '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and terminated with a non-success status.
    #[error(transparent)]
    Exit(#[from] ExitError),

    /// The cancellation token fired before the process finished.
    #[error("command cancelled")]
    Cancelled,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Annotation was requested for an error that is not an exit failure.
    #[error("error converting error to exit error")]
    Usage(#[source] Box<ExexError>),

    #[error(transparent)]
    Annotated(#[from] AnnotatedError),

    /// Waiting for the child, or copying its stderr, failed.
    #[error("waiting for '{program}' failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExexError>;

impl ExexError {
    /// The exit failure behind this error, looking through annotations.
    pub fn exit_error(&self) -> Option<&ExitError> {
        match self {
            ExexError::Exit(exit) => Some(exit),
            ExexError::Annotated(annotated) => annotated.exit_error(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExexError::Cancelled)
    }

    /// True for lookup misses and for launches that failed because the
    /// executable does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ExexError::Lookup(_) => true,
            ExexError::Launch { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// A process that ran and exited unsuccessfully.
///
/// `stderr` is `Some` whenever the wrapper captured the error stream (even if
/// the process wrote nothing), and `None` when the caller routed stderr
/// somewhere else.
#[derive(Error, Debug)]
#[error("{program}: {status}")]
pub struct ExitError {
    program: String,
    status: ExitStatus,
    stderr: Option<Vec<u8>>,
}

impl ExitError {
    pub(crate) fn new(program: String, status: ExitStatus, stderr: Option<Vec<u8>>) -> Self {
        Self {
            program,
            status,
            stderr,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    /// Exit code, or `None` if the process was terminated by a signal.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Captured stderr bytes, verbatim.
    pub fn stderr(&self) -> Option<&[u8]> {
        self.stderr.as_deref()
    }

    pub fn into_stderr(self) -> Option<Vec<u8>> {
        self.stderr
    }
}

/// No executable with the requested name exists on the search path.
///
/// Wraps the platform's own search error, and reports itself as
/// [`io::ErrorKind::NotFound`] for code that inspects I/O error kinds.
#[derive(Error, Debug)]
#[error("executable '{name}' not found: {source}")]
pub struct LookupError {
    name: String,
    source: which::Error,
}

impl LookupError {
    pub(crate) fn new(name: String, source: which::Error) -> Self {
        Self { name, source }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform_error(&self) -> &which::Error {
        &self.source
    }

    pub fn kind(&self) -> io::ErrorKind {
        io::ErrorKind::NotFound
    }
}

impl From<LookupError> for io::Error {
    fn from(err: LookupError) -> Self {
        io::Error::new(io::ErrorKind::NotFound, err)
    }
}

/// An exit failure combined with a caller-supplied message.
///
/// Displays as `message (error)`, followed by the captured stderr on its own
/// line when any was captured.
#[derive(Debug)]
pub struct AnnotatedError {
    message: String,
    source: Box<ExexError>,
}

impl AnnotatedError {
    pub(crate) fn new(message: String, source: ExexError) -> Self {
        Self {
            message,
            source: Box::new(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_error(&self) -> Option<&ExitError> {
        self.source.exit_error()
    }

    pub fn stderr(&self) -> Option<&[u8]> {
        self.exit_error().and_then(ExitError::stderr)
    }
}

impl fmt::Display for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.source)?;
        match self.stderr() {
            Some(stderr) if !stderr.is_empty() => {
                write!(f, "\n{}", String::from_utf8_lossy(stderr))
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for AnnotatedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
