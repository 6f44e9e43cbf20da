// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (scripts), and JSON output modes.

use crate::config::{EffectiveConfig, Sources};
use crate::lifecycle::{LogStream, OutputLine};
use crate::validate::{Severity, ValidationIssue};
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output (only results, problems, and container output)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("✓ {message} ({:.1}s)", elapsed);
                } else {
                    println!("✓ {message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("⚠ {message}"),
            OutputMode::Json => self.emit(&JsonEvent {
                event: "warning",
                message,
                duration_secs: None,
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Relay a line from the container process.
    pub fn child_line(&self, line: &OutputLine) {
        match (self.mode, line.stream) {
            (OutputMode::Json, _) => self.emit(&ChildLineEvent {
                event: "output",
                stream: line.stream,
                message: &line.content,
            }),
            (_, LogStream::Stdout) => println!("{}", line.content),
            (_, LogStream::Stderr) => eprintln!("{}", line.content),
        }
    }

    /// Print one validation issue with its fix hint.
    pub fn issue(&self, issue: &ValidationIssue) {
        match self.mode {
            OutputMode::Json => self.emit(&IssueEvent {
                event: "issue",
                issue,
            }),
            OutputMode::Quiet if issue.severity == Severity::Warning => {}
            _ => {
                let symbol = if issue.is_blocking() { "✗" } else { "⚠" };
                eprintln!("{symbol} {}", issue.message);
                if let Some(hint) = &issue.fix_hint {
                    eprintln!("  → {hint}");
                }
            }
        }
    }

    /// Print the resolved configuration and where each value came from.
    pub fn config_table(&self, config: &EffectiveConfig, sources: &Sources) {
        match self.mode {
            OutputMode::Normal => {
                println!("Configuration:");
                let rows = [
                    ("Runtime", config.runtime.as_str(), sources.runtime),
                    ("GPU", config.gpu.as_str(), sources.gpu),
                    ("Display", config.display.as_str(), sources.display),
                    ("Audio", config.audio.as_str(), sources.audio),
                ];
                for (name, value, source) in rows {
                    println!("  {name:<8} {value:<12} ({source})");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit(&ConfigEvent {
                event: "config",
                config,
                sources,
            }),
        }
    }

    /// Print an arbitrary structured payload as a JSON line (json mode only).
    pub fn json<T: Serialize>(&self, event: &str, data: &T) {
        if self.mode == OutputMode::Json {
            self.emit(&DataEvent { event, data });
        }
    }

    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct ChildLineEvent<'a> {
    event: &'a str,
    stream: LogStream,
    message: &'a str,
}

#[derive(Serialize)]
struct IssueEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    issue: &'a ValidationIssue,
}

#[derive(Serialize)]
struct ConfigEvent<'a> {
    event: &'a str,
    config: &'a EffectiveConfig,
    sources: &'a Sources,
}

#[derive(Serialize)]
struct DataEvent<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}
