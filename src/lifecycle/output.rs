// ABOUTME: Line and event types streamed from a running compose process.
// ABOUTME: Recognizes the log markers that mean the game launcher window is up.

use serde::Serialize;
use std::fmt;

/// Log lines that show the launcher finished loading.
pub const STARTED_MARKERS: [&str; 2] = ["[Loading] SUCCESS", "Started!"];

/// Which pipe a line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// A single line of child output, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub stream: LogStream,
    pub content: String,
}

impl OutputLine {
    pub fn stdout(content: impl Into<String>) -> Self {
        Self {
            stream: LogStream::Stdout,
            content: content.into(),
        }
    }

    pub fn stderr(content: impl Into<String>) -> Self {
        Self {
            stream: LogStream::Stderr,
            content: content.into(),
        }
    }

    /// Whether this line shows the launcher has started.
    pub fn marks_started(&self) -> bool {
        STARTED_MARKERS.iter().any(|m| self.content.contains(m))
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Event delivered from a background start to its single consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Output(OutputLine),
    /// Sent once, right after the first line that marks startup.
    Started,
}

/// Whether the compose project's container is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningState {
    /// Status could not be determined (runtime missing, command failed or timed out).
    Unknown,
    Stopped,
    Running,
}

impl fmt::Display for RunningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunningState::Unknown => write!(f, "unknown"),
            RunningState::Stopped => write!(f, "stopped"),
            RunningState::Running => write!(f, "running"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_markers_are_detected() {
        assert!(OutputLine::stdout("tlauncher-1 | [Loading] SUCCESS").marks_started());
        assert!(OutputLine::stderr("Started!").marks_started());
        assert!(!OutputLine::stdout("Starting container").marks_started());
    }
}
