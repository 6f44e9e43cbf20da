// ABOUTME: Narrow capability interface for read-only host probes.
// ABOUTME: Detection and validation depend on this trait so tests can substitute a fake host.

mod system;

pub use system::SystemProbe;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default upper bound for a single probe command.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Captured result of a probe command that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    /// Create output for a command that exited with the given code.
    pub fn new(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Why a probe command produced no output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    #[error("command failed: {0}")]
    Io(String),
}

/// Read-only view of the host: executables, paths, environment, and short commands.
///
/// Implementations must never block indefinitely; `run` enforces its timeout and every
/// other method answers from the local filesystem or process environment.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Resolve an executable on `PATH`.
    fn which(&self, binary: &str) -> Option<PathBuf>;

    fn path_exists(&self, path: &Path) -> bool;

    /// Entry names inside a directory. Empty when the directory is missing or unreadable.
    fn list_dir(&self, dir: &Path) -> Vec<String>;

    /// Environment variable value. Empty values are reported as unset.
    fn env_var(&self, name: &str) -> Option<String>;

    /// Real user id of the current process.
    fn uid(&self) -> Option<u32>;

    /// Run a command with an argument list (never through a shell) and capture its output.
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ProbeOutput, ProbeError>;
}

/// Path of the per-user PulseAudio/PipeWire socket.
pub fn pulse_socket_path(uid: u32) -> PathBuf {
    PathBuf::from(format!("/run/user/{uid}/pulse/native"))
}
