#![allow(dead_code)]

pub use exex_test_utils::fixtures;
pub use exex_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Stderr payload of an exit failure, as UTF-8.
pub fn captured(err: &exex::ExexError) -> Option<String> {
    err.exit_error()
        .and_then(exex::ExitError::stderr)
        .map(|b| String::from_utf8_lossy(b).into_owned())
}
