// src/exec/running.rs

//! The in-flight half of a start/wait split.

use std::io;
use std::process::ExitStatus;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::{ExexError, ExitError, Result};
use crate::exec::capture::StderrCopy;

/// A spawned child process, returned by [`Command::start`](crate::Command::start).
///
/// Between `start` and `wait` the caller may feed stdin or stream stdout;
/// stderr keeps draining in the background, so the capture guarantee holds
/// on the `wait` path.
pub struct RunningCommand {
    program: String,
    child: Child,
    stderr: StderrCopy,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for RunningCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningCommand")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

impl RunningCommand {
    pub(crate) fn new(
        program: String,
        child: Child,
        stderr: StderrCopy,
        cancel: Option<CancellationToken>,
    ) -> Self {
        Self {
            program,
            child,
            stderr,
            cancel,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// OS process id, or `None` once the child has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Take the child's stdin pipe, if it was configured as piped.
    ///
    /// Drop it to signal end of input; an untaken stdin is closed by `wait`.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the stderr pipe requested with `Command::stderr(Stdio::piped())`.
    ///
    /// Always `None` when the wrapper captures or forwards stderr itself.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the child to exit.
    ///
    /// Also waits for the stderr drain to reach end of stream, then returns
    /// [`ExexError::Exit`] with the captured bytes on a non-success status.
    /// A cancelled token kills the child and yields [`ExexError::Cancelled`].
    pub async fn wait(self) -> Result<()> {
        let RunningCommand {
            program,
            mut child,
            stderr,
            cancel,
        } = self;

        let status = match wait_for_exit(&program, &mut child, cancel.as_ref()).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                stderr.abandon();
                return Err(ExexError::Cancelled);
            }
            Err(source) => {
                stderr.abandon();
                return Err(ExexError::Wait { program, source });
            }
        };

        let captured = match stderr.finish().await {
            Ok(captured) => captured,
            Err(source) => return Err(ExexError::Wait { program, source }),
        };

        if status.success() {
            debug!(program = %program, "child process exited successfully");
            return Ok(());
        }

        debug!(
            program = %program,
            status = %status,
            stderr_bytes = captured.as_ref().map(Vec::len),
            "child process exited unsuccessfully"
        );

        Err(ExitError::new(program, status, captured).into())
    }

    /// Like [`RunningCommand::wait`], additionally collecting stdout.
    ///
    /// Returns an empty buffer if stdout was not piped or was already taken.
    pub async fn wait_with_output(mut self) -> Result<Vec<u8>> {
        let program = self.program.clone();
        let stdout = self.child.stdout.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                pipe.read_to_end(&mut buf).await?;
                Ok::<_, io::Error>(buf)
            })
        });

        if let Err(err) = self.wait().await {
            if let Some(handle) = &stdout {
                handle.abort();
            }
            return Err(err);
        }

        match stdout {
            Some(handle) => handle
                .await
                .map_err(io::Error::other)
                .and_then(|res| res)
                .map_err(|source| ExexError::Wait { program, source }),
            None => Ok(Vec::new()),
        }
    }
}

/// Wait for exit, or kill the child when the token fires first.
///
/// `Ok(None)` means the child was cancelled.
async fn wait_for_exit(
    program: &str,
    child: &mut Child,
    cancel: Option<&CancellationToken>,
) -> io::Result<Option<ExitStatus>> {
    let Some(token) = cancel else {
        return child.wait().await.map(Some);
    };

    tokio::select! {
        biased;

        status = child.wait() => status.map(Some),

        _ = token.cancelled() => {
            debug!(
                program = %program,
                pid = ?child.id(),
                "cancellation requested; killing child process"
            );
            if let Err(e) = child.kill().await {
                warn!(
                    program = %program,
                    error = %e,
                    "failed to kill child process on cancellation"
                );
            }
            Ok(None)
        }
    }
}
