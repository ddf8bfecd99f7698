// src/exec/command.rs

//! The command builder.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{ExexError, Result};
use crate::exec::capture::{StderrCopy, StderrWriter};
use crate::exec::running::RunningCommand;

/// Where the child's stderr goes.
enum StderrTarget {
    /// Captured by the wrapper.
    Unset,
    Stdio(Stdio),
    Writer(StderrWriter),
    /// Whatever the adopted command was configured with; left untouched.
    Preset,
}

/// What [`Command::adopt`] does with the adopted command's stderr.
///
/// Neither `std` nor `tokio` can report how a command's stderr was
/// configured, so the caller states it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdoptStderr {
    /// Stderr was left at its default; capture it.
    Capture,
    /// Stderr was already redirected; keep that destination and do not
    /// capture.
    Preserve,
}

impl fmt::Debug for StderrTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StderrTarget::Unset => f.write_str("Unset"),
            StderrTarget::Stdio(stdio) => f.debug_tuple("Stdio").field(stdio).finish(),
            StderrTarget::Writer(_) => f.write_str("Writer(..)"),
            StderrTarget::Preset => f.write_str("Preset"),
        }
    }
}

/// An external program ready to be executed once.
///
/// Behaves like [`tokio::process::Command`], except that when the process
/// exits unsuccessfully the returned [`ExitError`](crate::ExitError) carries
/// everything the process wrote to stderr, unless stderr was redirected
/// through [`Command::stderr`] or [`Command::stderr_writer`].
///
/// `run`, `start` and `output` consume the command; a process cannot be
/// executed twice.
#[derive(Debug)]
pub struct Command {
    inner: tokio::process::Command,
    stderr: StderrTarget,
    stdout_set: bool,
    cancel: Option<CancellationToken>,
}

impl Command {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self::from_tokio(tokio::process::Command::new(program))
    }

    /// Like [`Command::new`], with a cancellation token attached.
    ///
    /// `None` is accepted and means no cancellation.
    pub fn with_cancellation<S, T>(token: T, program: S) -> Self
    where
        S: AsRef<OsStr>,
        T: Into<Option<CancellationToken>>,
    {
        let mut cmd = Self::new(program);
        cmd.cancel = token.into();
        cmd
    }

    /// Wrap a command built elsewhere (`std` or `tokio`).
    ///
    /// With [`AdoptStderr::Preserve`] the command's own stderr setting is
    /// used as is, exactly like a [`Command::stderr`] override.
    pub fn adopt<C>(cmd: C, stderr: AdoptStderr) -> Self
    where
        C: Into<tokio::process::Command>,
    {
        let mut adopted = Self::from_tokio(cmd.into());
        if stderr == AdoptStderr::Preserve {
            adopted.stderr = StderrTarget::Preset;
        }
        adopted
    }

    fn from_tokio(inner: tokio::process::Command) -> Self {
        Self {
            inner,
            stderr: StderrTarget::Unset,
            stdout_set: false,
            cancel: None,
        }
    }

    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn env<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.env(key, val);
        self
    }

    pub fn envs<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.envs(vars);
        self
    }

    pub fn env_remove<K: AsRef<OsStr>>(&mut self, key: K) -> &mut Self {
        self.inner.env_remove(key);
        self
    }

    pub fn env_clear(&mut self) -> &mut Self {
        self.inner.env_clear();
        self
    }

    pub fn current_dir<P: AsRef<Path>>(&mut self, dir: P) -> &mut Self {
        self.inner.current_dir(dir);
        self
    }

    pub fn stdin<T: Into<Stdio>>(&mut self, cfg: T) -> &mut Self {
        self.inner.stdin(cfg);
        self
    }

    pub fn stdout<T: Into<Stdio>>(&mut self, cfg: T) -> &mut Self {
        self.inner.stdout(cfg);
        self.stdout_set = true;
        self
    }

    /// Route stderr through a stdio override. Disables capture.
    ///
    /// With `Stdio::piped()` the pipe is handed out by
    /// [`RunningCommand::take_stderr`].
    pub fn stderr<T: Into<Stdio>>(&mut self, cfg: T) -> &mut Self {
        self.stderr = StderrTarget::Stdio(cfg.into());
        self
    }

    /// Copy stderr verbatim into `writer`. Disables capture.
    ///
    /// The writer is flushed before [`RunningCommand::wait`] returns.
    pub fn stderr_writer<W>(&mut self, writer: W) -> &mut Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.stderr = StderrTarget::Writer(Box::new(writer));
        self
    }

    pub fn kill_on_drop(&mut self, kill_on_drop: bool) -> &mut Self {
        self.inner.kill_on_drop(kill_on_drop);
        self
    }

    /// Attach (or with `None`, detach) a cancellation token.
    pub fn cancel_on<T: Into<Option<CancellationToken>>>(&mut self, token: T) -> &mut Self {
        self.cancel = token.into();
        self
    }

    pub fn get_program(&self) -> &OsStr {
        self.inner.as_std().get_program()
    }

    pub fn as_std(&self) -> &std::process::Command {
        self.inner.as_std()
    }

    fn program_name(&self) -> String {
        self.get_program().to_string_lossy().into_owned()
    }

    /// Spawn the process without waiting for it.
    ///
    /// Fails with [`ExexError::Cancelled`] without spawning anything if the
    /// token is already cancelled.
    pub fn start(self) -> Result<RunningCommand> {
        let program = self.program_name();
        let Command {
            mut inner,
            stderr,
            cancel,
            ..
        } = self;

        if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            debug!(program = %program, "token already cancelled; not spawning");
            return Err(ExexError::Cancelled);
        }

        let drain = match stderr {
            StderrTarget::Unset => {
                inner.stderr(Stdio::piped());
                Drain::Capture
            }
            StderrTarget::Writer(writer) => {
                inner.stderr(Stdio::piped());
                Drain::Forward(writer)
            }
            StderrTarget::Stdio(stdio) => {
                inner.stderr(stdio);
                Drain::None
            }
            StderrTarget::Preset => Drain::None,
        };

        let mut child = inner.spawn().map_err(|source| ExexError::Launch {
            program: program.clone(),
            source,
        })?;

        // Caller-configured pipes stay on the child for `take_stderr`.
        let stderr_copy = match drain {
            Drain::Capture => child
                .stderr
                .take()
                .map_or(StderrCopy::Passthrough, StderrCopy::capture),
            Drain::Forward(writer) => match child.stderr.take() {
                Some(pipe) => StderrCopy::forward(pipe, writer),
                None => StderrCopy::Passthrough,
            },
            Drain::None => StderrCopy::Passthrough,
        };

        debug!(program = %program, pid = ?child.id(), "spawned child process");

        Ok(RunningCommand::new(program, child, stderr_copy, cancel))
    }

    /// Run the process to completion.
    ///
    /// On a non-success exit the error is [`ExexError::Exit`], carrying the
    /// full stderr unless stderr was redirected.
    pub async fn run(self) -> Result<()> {
        self.start()?.wait().await
    }

    /// Run the process to completion and return its stdout.
    ///
    /// Stdout is piped unless [`Command::stdout`] set it, in which case the
    /// returned buffer is empty. Stderr follows the same rules as
    /// [`Command::run`].
    pub async fn output(mut self) -> Result<Vec<u8>> {
        if !self.stdout_set {
            self.inner.stdout(Stdio::piped());
        }
        self.start()?.wait_with_output().await
    }
}

enum Drain {
    Capture,
    Forward(StderrWriter),
    None,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let std = self.inner.as_std();
        write!(f, "{}", std.get_program().to_string_lossy())?;
        for arg in std.get_args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
