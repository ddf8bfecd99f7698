// tests/annotate.rs

#![cfg(unix)]

mod common;
use crate::common::fixtures;
use crate::common::{TestResult, init_tracing, with_timeout};

use std::process::Stdio;

use exex::{Annotate, Command, ExexError, annotate_error};

#[tokio::test]
async fn annotated_failure_shows_message_error_and_stderr() -> TestResult {
    init_tracing();

    let err = with_timeout(fixtures::failing("boom", 1).run())
        .await
        .expect_err("program exits 1");
    let original = err.to_string();

    let annotated = annotate_error(err, "step failed");
    let text = annotated.to_string();

    assert!(text.contains("step failed"));
    assert!(text.contains(&original));
    assert_eq!(text.lines().last(), Some("boom"));
    match &annotated {
        ExexError::Annotated(inner) => {
            assert_eq!(inner.message(), "step failed");
            assert_eq!(inner.stderr(), Some(&b"boom"[..]));
        }
        other => panic!("expected Annotated, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn redirected_stderr_yields_message_without_trailer() -> TestResult {
    init_tracing();

    let mut cmd = fixtures::failing("hidden", 1);
    cmd.stderr(Stdio::null());

    let err = with_timeout(cmd.run())
        .await
        .annotate("step failed")
        .expect_err("program exits 1");

    let text = err.to_string();
    assert!(text.starts_with("step failed ("));
    assert!(!text.contains('\n'));
    assert!(!text.contains("hidden"));
    Ok(())
}

#[tokio::test]
async fn success_passes_through_annotation() -> TestResult {
    init_tracing();

    with_timeout(fixtures::sh("exit 0", Vec::<String>::new()).run())
        .await
        .annotate("never shown")?;
    Ok(())
}

#[tokio::test]
async fn launch_failure_is_a_usage_error() -> TestResult {
    init_tracing();

    let err = with_timeout(Command::new("/nonexistent/exex-missing-program").run())
        .await
        .annotate("step failed")
        .expect_err("cannot launch");

    match err {
        ExexError::Usage(inner) => assert!(matches!(*inner, ExexError::Launch { .. })),
        other => panic!("expected Usage, got {other:?}"),
    }
    Ok(())
}
