// ABOUTME: Application-wide error types for craftpod.
// ABOUTME: Uses thiserror and maps each failure class to a distinct process exit code.

use crate::compose::ComposeError;
use crate::lifecycle::LifecycleError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a generic failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when validation or configuration blocks startup.
pub const EXIT_BLOCKED: i32 = 2;
/// Exit code when the orchestration process itself exits non-zero.
pub const EXIT_CHILD_FAILED: i32 = 3;
/// Exit code after Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot determine the user configuration directory")]
    NoConfigDir,

    #[error("invalid preference file {}: {source}", .path.display())]
    InvalidPreferences {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("system validation failed with {0} blocking issue(s)")]
    ValidationFailed(usize),

    #[error("container is already running; stop it first")]
    AlreadyRunning,

    #[error("{program} exited with {}", describe_exit(.code))]
    ChildProcess { program: String, code: Option<i32> },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("interrupted")]
    Interrupted,

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Process exit code for this failure.
    ///
    /// Blocking validation and configuration problems are distinguishable from the
    /// orchestration process failing on its own.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ValidationFailed(_) | Error::Compose(_) | Error::InvalidPreferences { .. } => {
                EXIT_BLOCKED
            }
            Error::ChildProcess { .. } => EXIT_CHILD_FAILED,
            Error::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
