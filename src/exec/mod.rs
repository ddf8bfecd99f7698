// src/exec/mod.rs

//! Process execution layer.
//!
//! Wraps `tokio::process` so that a failed child always reports its stderr.
//!
//! - [`command`] holds the [`Command`] builder and the run/start/output entry
//!   points.
//! - [`running`] holds [`RunningCommand`], the in-flight half of a
//!   start/wait split, and the exit enrichment.
//! - [`capture`] owns the background stderr drain (capture sink or caller
//!   writer).

pub mod capture;
pub mod command;
pub mod running;

pub use capture::CAPTURE_CAPACITY;
pub use command::{AdoptStderr, Command};
pub use running::RunningCommand;
