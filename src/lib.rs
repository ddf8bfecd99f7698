// src/lib.rs

//! `exex` runs external commands and guarantees that a failed command's
//! stderr is available on the returned error.
//!
//! With `tokio::process` alone, only `output()` collects stderr, and it also
//! buffers stdout. Here every execution path (`run`, `start`/`wait`,
//! `output`) drains stderr into a small growable buffer and attaches it to
//! [`ExitError`] when the process exits unsuccessfully, unless the caller
//! redirected stderr explicitly.

pub mod annotate;
pub mod cli;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod lookup;

use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use crate::annotate::{Annotate, annotate_error};
pub use crate::errors::{AnnotatedError, ExexError, ExitError, LookupError, Result};
pub use crate::exec::{AdoptStderr, CAPTURE_CAPACITY, Command, RunningCommand};
pub use crate::lookup::{lookup_executable, lookup_executable_in};

use crate::cli::{CliArgs, CliCommand};

/// Run `program` with `args` to completion.
pub async fn run<S, I, A>(program: S, args: I) -> Result<()>
where
    S: AsRef<OsStr>,
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.run().await
}

/// Like [`run`], killing the process if `token` is cancelled.
pub async fn run_with_cancellation<T, S, I, A>(token: T, program: S, args: I) -> Result<()>
where
    T: Into<Option<CancellationToken>>,
    S: AsRef<OsStr>,
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
{
    let mut cmd = Command::with_cancellation(token, program);
    cmd.args(args);
    cmd.run().await
}

/// Run a command built elsewhere (for example a `std::process::Command`).
///
/// `stderr` states whether the command's stderr was left at its default (and
/// should be captured) or was already redirected by the caller.
pub async fn run_command<C>(cmd: C, stderr: AdoptStderr) -> Result<()>
where
    C: Into<tokio::process::Command>,
{
    Command::adopt(cmd, stderr).run().await
}

/// Exit code used when the run is interrupted with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// High-level entry point used by `main.rs`.
///
/// Ctrl-C cancels a running child. Returns the process exit code for the
/// `exex` binary.
pub async fn run_cli(args: CliArgs) -> anyhow::Result<i32> {
    let token = CancellationToken::new();

    // Ctrl-C → cancel the child.
    {
        let token = token.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            token.cancel();
        });
    }

    run_cli_with(args, token, &mut std::io::stderr()).await
}

/// [`run_cli`] with an explicit cancellation token and a destination for
/// the failure report.
pub async fn run_cli_with<W: Write>(
    args: CliArgs,
    token: CancellationToken,
    report: &mut W,
) -> anyhow::Result<i32> {
    match args.command {
        CliCommand::Run { message, dir, argv } => {
            run_program(argv, message, dir, token, report).await
        }
        CliCommand::Which { name } => which_program(&name, report),
    }
}

async fn run_program<W: Write>(
    argv: Vec<String>,
    message: Option<String>,
    dir: Option<PathBuf>,
    token: CancellationToken,
    report: &mut W,
) -> anyhow::Result<i32> {
    let (program, args) = argv
        .split_first()
        .context("no program given to run")?;

    let mut cmd = Command::with_cancellation(token, program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    debug!(command = %cmd, "running command");

    let message = message.unwrap_or_else(|| format!("'{program}' failed"));
    match cmd.run().await.annotate(message) {
        Ok(()) => Ok(0),
        Err(ExexError::Usage(inner)) => match *inner {
            ExexError::Cancelled => {
                debug!("run interrupted");
                writeln!(report, "exex: interrupted")?;
                Ok(INTERRUPTED_EXIT_CODE)
            }
            other => Err(other).with_context(|| format!("running '{program}'")),
        },
        Err(err) => {
            writeln!(report, "{err}")?;
            // Signalled children have no code.
            Ok(err.exit_error().and_then(ExitError::code).unwrap_or(1))
        }
    }
}

fn which_program<W: Write>(name: &str, report: &mut W) -> anyhow::Result<i32> {
    match lookup_executable(name) {
        Ok(path) => {
            println!("{}", path.display());
            Ok(0)
        }
        Err(err) => {
            writeln!(report, "exex: {err}")?;
            Ok(1)
        }
    }
}
