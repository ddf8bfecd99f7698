// src/exec/capture.rs

//! Background handling of a child's stderr pipe.
//!
//! When the wrapper owns stderr, a drain task reads the pipe into a
//! [`CAPTURE_CAPACITY`]-sized buffer for the whole lifetime of the child, so
//! the child never blocks on a full pipe and nothing is truncated. When the
//! caller supplied a writer, the task copies the pipe into it instead.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;
use tracing::trace;

/// Initial capacity of the capture buffer.
pub const CAPTURE_CAPACITY: usize = 1024;

/// Caller-provided destination for a copy of the child's stderr.
pub type StderrWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The stderr handling attached to one running child.
pub(crate) enum StderrCopy {
    /// Wrapper-owned capture sink.
    Capture(JoinHandle<io::Result<Vec<u8>>>),
    /// Verbatim copy into a caller writer.
    Forward(JoinHandle<io::Result<u64>>),
    /// Caller routed stderr through a stdio override; nothing to do.
    Passthrough,
}

impl StderrCopy {
    pub(crate) fn capture(mut stderr: ChildStderr) -> Self {
        let handle = tokio::spawn(async move {
            let mut sink = Vec::with_capacity(CAPTURE_CAPACITY);
            stderr.read_to_end(&mut sink).await?;
            trace!(stderr_bytes = sink.len(), "stderr drain finished");
            Ok::<_, io::Error>(sink)
        });
        StderrCopy::Capture(handle)
    }

    pub(crate) fn forward(mut stderr: ChildStderr, mut writer: StderrWriter) -> Self {
        let handle = tokio::spawn(async move {
            let copied = tokio::io::copy(&mut stderr, &mut writer).await?;
            writer.flush().await?;
            trace!(stderr_bytes = copied, "stderr forwarded to caller writer");
            Ok::<_, io::Error>(copied)
        });
        StderrCopy::Forward(handle)
    }

    /// Wait for the copy to finish.
    ///
    /// Returns the captured bytes only for [`StderrCopy::Capture`].
    pub(crate) async fn finish(self) -> io::Result<Option<Vec<u8>>> {
        match self {
            StderrCopy::Capture(handle) => join(handle).await.map(Some),
            StderrCopy::Forward(handle) => join(handle).await.map(|_| None),
            StderrCopy::Passthrough => Ok(None),
        }
    }

    /// Stop copying without waiting for end of stream.
    ///
    /// Used after a kill, where a grandchild may still hold the pipe open.
    pub(crate) fn abandon(self) {
        match self {
            StderrCopy::Capture(handle) => handle.abort(),
            StderrCopy::Forward(handle) => handle.abort(),
            StderrCopy::Passthrough => {}
        }
    }
}

async fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle.await.map_err(io::Error::other)?
}
