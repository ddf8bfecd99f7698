// src/annotate.rs

//! Turning an exit failure into a user-facing message.

use tracing::warn;

use crate::errors::{AnnotatedError, ExexError, Result};

/// Combine an exit failure with `message` and its captured stderr.
///
/// Errors that are not exit failures (launch failures, cancellation, ...)
/// become [`ExexError::Usage`]: annotating them is a caller mistake.
pub fn annotate_error(err: ExexError, message: impl Into<String>) -> ExexError {
    if err.exit_error().is_none() {
        warn!(error = %err, "annotation requested for a non-exit error");
        return ExexError::Usage(Box::new(err));
    }
    AnnotatedError::new(message.into(), err).into()
}

/// [`annotate_error`] as a method on results. `Ok` values pass through.
pub trait Annotate<T> {
    fn annotate(self, message: impl Into<String>) -> Result<T>;
}

impl<T> Annotate<T> for Result<T> {
    fn annotate(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|err| annotate_error(err, message))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::errors::ExitError;
    use proptest::prelude::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn exit_failure(stderr: Option<&[u8]>) -> ExexError {
        ExitError::new(
            "build".to_string(),
            ExitStatus::from_raw(1 << 8),
            stderr.map(<[u8]>::to_vec),
        )
        .into()
    }

    #[test]
    fn ok_passes_through() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.annotate("unused").ok(), Some(7));
    }

    #[test]
    fn payload_is_appended_on_its_own_line() {
        let err = exit_failure(Some(b"boom"));
        let original = err.to_string();

        let annotated = annotate_error(err, "step failed");
        let text = annotated.to_string();

        assert!(text.starts_with("step failed ("));
        assert!(text.contains(&original));
        assert!(text.ends_with("\nboom"));
        assert_eq!(
            annotated.exit_error().and_then(ExitError::stderr),
            Some(&b"boom"[..])
        );
    }

    #[test]
    fn empty_or_missing_payload_adds_no_trailer() {
        for stderr in [None, Some(&b""[..])] {
            let err = exit_failure(stderr);
            let original = err.to_string();
            let text = annotate_error(err, "step failed").to_string();
            assert_eq!(text, format!("step failed ({original})"));
        }
    }

    #[test]
    fn non_exit_error_is_a_usage_error() {
        let annotated = annotate_error(ExexError::Cancelled, "step failed");
        match annotated {
            ExexError::Usage(inner) => assert!(inner.is_cancelled()),
            other => panic!("expected Usage, got {other:?}"),
        }
    }

    #[test]
    fn annotations_nest() {
        let once = annotate_error(exit_failure(Some(b"boom")), "inner");
        let twice = annotate_error(once, "outer");
        assert!(matches!(twice, ExexError::Annotated(_)));
        assert!(twice.to_string().starts_with("outer (inner ("));
    }

    proptest! {
        #[test]
        fn payload_survives_verbatim(
            message in "[a-z ]{1,20}",
            payload in "[ -~\n]{1,200}",
        ) {
            let err = exit_failure(Some(payload.as_bytes()));
            let original = err.to_string();
            let text = annotate_error(err, message.clone()).to_string();
            prop_assert_eq!(text, format!("{message} ({original})\n{payload}"));
        }
    }
}
