// ABOUTME: Lifecycle error types with SNAFU context selectors.
// ABOUTME: Exposes an error kind so callers can tell a missing binary from other failures.

use snafu::Snafu;
use std::time::Duration;

/// Failure while launching, streaming, signalling, or waiting on a child process.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LifecycleError {
    #[snafu(display("failed to launch {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("failed to read output of {program}: {source}"))]
    ReadOutput {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("failed waiting for {program}: {source}"))]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} did not finish within {timeout:?}"))]
    Timeout { program: String, timeout: Duration },

    #[snafu(display("failed to signal process group {pgid}: {source}"))]
    Signal {
        pgid: i32,
        source: nix::errno::Errno,
    },

    #[snafu(display("could not stop the running container"))]
    StopFailed,
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    /// The orchestration binary is not installed.
    ProgramNotFound,
    /// Spawning, reading, or waiting failed for another I/O reason.
    Io,
    /// A bounded command ran past its deadline.
    Timeout,
    /// The tracked process group could not be signalled.
    Signal,
    /// Stopping the container before a restart failed.
    StopFailed,
}

impl LifecycleError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> LifecycleErrorKind {
        match self {
            LifecycleError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                LifecycleErrorKind::ProgramNotFound
            }
            LifecycleError::Spawn { .. }
            | LifecycleError::ReadOutput { .. }
            | LifecycleError::Wait { .. } => LifecycleErrorKind::Io,
            LifecycleError::Timeout { .. } => LifecycleErrorKind::Timeout,
            LifecycleError::Signal { .. } => LifecycleErrorKind::Signal,
            LifecycleError::StopFailed => LifecycleErrorKind::StopFailed,
        }
    }
}
