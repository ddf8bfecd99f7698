// src/lookup.rs

//! Executable search under the crate's own error type.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::LookupError;

/// Search the directories in `PATH` for an executable named `name`.
pub fn lookup_executable<S: AsRef<OsStr>>(name: S) -> Result<PathBuf, LookupError> {
    let name = name.as_ref();
    which::which(name).map_err(|source| not_found(name, source))
}

/// Search an explicit path list instead of the process `PATH`.
///
/// `paths` uses the platform's `PATH` syntax; `cwd` resolves relative names.
pub fn lookup_executable_in<S, P, C>(
    name: S,
    paths: Option<P>,
    cwd: C,
) -> Result<PathBuf, LookupError>
where
    S: AsRef<OsStr>,
    P: AsRef<OsStr>,
    C: AsRef<Path>,
{
    let name = name.as_ref();
    which::which_in(name, paths, cwd).map_err(|source| not_found(name, source))
}

fn not_found(name: &OsStr, source: which::Error) -> LookupError {
    debug!(name = %name.to_string_lossy(), error = %source, "executable lookup failed");
    LookupError::new(name.to_string_lossy().into_owned(), source)
}
