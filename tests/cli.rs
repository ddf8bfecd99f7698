// tests/cli.rs

#![cfg(unix)]

mod common;
use crate::common::{TestResult, init_tracing, with_timeout};

use clap::Parser;
use exex::INTERRUPTED_EXIT_CODE;
use exex::cli::CliArgs;
use tokio_util::sync::CancellationToken;

/// Run the CLI on `argv`, returning the exit code and what was reported on
/// the diagnostics stream.
async fn exex_cli(argv: &[&str], token: CancellationToken) -> anyhow::Result<(i32, String)> {
    let args = CliArgs::try_parse_from(std::iter::once("exex").chain(argv.iter().copied()))?;
    let mut report = Vec::new();
    let code = with_timeout(exex::run_cli_with(args, token, &mut report)).await?;
    Ok((code, String::from_utf8(report)?))
}

#[tokio::test]
async fn success_exits_zero_and_reports_nothing() -> TestResult {
    init_tracing();

    let (code, report) = exex_cli(&["run", "--", "sh", "-c", "exit 0"], CancellationToken::new()).await?;
    assert_eq!(code, 0);
    assert!(report.is_empty());
    Ok(())
}

#[tokio::test]
async fn child_exit_code_is_forwarded() -> TestResult {
    init_tracing();

    let (code, report) = exex_cli(&["run", "--", "sh", "-c", "exit 7"], CancellationToken::new()).await?;
    assert_eq!(code, 7);
    assert!(report.starts_with("'sh' failed ("), "{report}");
    Ok(())
}

#[tokio::test]
async fn signalled_child_exits_one() -> TestResult {
    init_tracing();

    let (code, _) = exex_cli(
        &["run", "--", "sh", "-c", "kill -9 $$"],
        CancellationToken::new(),
    )
    .await?;
    assert_eq!(code, 1);
    Ok(())
}

#[tokio::test]
async fn failure_report_carries_message_and_stderr() -> TestResult {
    init_tracing();

    let (code, report) = exex_cli(
        &["run", "-m", "lint failed", "--", "sh", "-c", "printf bad >&2; exit 3"],
        CancellationToken::new(),
    )
    .await?;
    assert_eq!(code, 3);
    assert!(report.starts_with("lint failed ("), "{report}");
    assert!(report.ends_with("\nbad\n"), "{report:?}");
    Ok(())
}

#[tokio::test]
async fn run_honours_working_directory() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("marker"), "")?;
    let dir_arg = dir.path().to_string_lossy().into_owned();

    let (code, _) = exex_cli(
        &["run", "--dir", &dir_arg, "--", "test", "-e", "marker"],
        CancellationToken::new(),
    )
    .await?;
    assert_eq!(code, 0);
    Ok(())
}

#[tokio::test]
async fn cancelled_run_exits_130() -> TestResult {
    init_tracing();

    let token = CancellationToken::new();
    token.cancel();

    let (code, report) = exex_cli(&["run", "--", "sleep", "30"], token).await?;
    assert_eq!(code, INTERRUPTED_EXIT_CODE);
    assert_eq!(report, "exex: interrupted\n");
    Ok(())
}

#[tokio::test]
async fn cancellation_during_run_exits_130() -> TestResult {
    init_tracing();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let (code, _) = exex_cli(&["run", "--", "sh", "-c", "exec sleep 30"], token).await?;
    assert_eq!(code, INTERRUPTED_EXIT_CODE);
    Ok(())
}

#[tokio::test]
async fn which_miss_exits_one() -> TestResult {
    init_tracing();

    let (code, report) = exex_cli(
        &["which", "exex-no-such-program-anywhere"],
        CancellationToken::new(),
    )
    .await?;
    assert_eq!(code, 1);
    assert!(report.contains("exex-no-such-program-anywhere"), "{report}");
    Ok(())
}

#[tokio::test]
async fn which_hit_exits_zero() -> TestResult {
    init_tracing();

    let (code, report) = exex_cli(&["which", "sh"], CancellationToken::new()).await?;
    assert_eq!(code, 0);
    assert!(report.is_empty());
    Ok(())
}
