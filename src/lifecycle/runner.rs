// ABOUTME: Launches compose commands as child processes and relays their output.
// ABOUTME: Tracks the foreground child's process group so it can be terminated gracefully.

use super::error::{
    LifecycleError, ReadOutputSnafu, SignalSnafu, SpawnSnafu, TimeoutSnafu, WaitSnafu,
};
use super::output::{LifecycleEvent, OutputLine, RunningState};
use crate::compose::CommandLine;
use futures::Stream;
use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use parking_lot::Mutex;
use snafu::ResultExt;
use std::process::{ExitStatus, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Service container the compose project runs.
pub const DEFAULT_CONTAINER: &str = "tlauncher";

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const DOWN_TIMEOUT: Duration = Duration::from_secs(15);
/// Extra time allowed for `compose stop` beyond the container grace period.
const STOP_SLACK: Duration = Duration::from_secs(15);

/// Snapshot of `compose ps`.
#[derive(Debug, Clone)]
pub struct ContainerStatus {
    pub state: RunningState,
    /// Raw `ps` output, or the failure reason when the state is unknown.
    pub detail: String,
}

/// Handle to a start running on a background task.
pub struct BackgroundStart {
    /// Output lines and the started marker, in arrival order.
    pub events: mpsc::UnboundedReceiver<LifecycleEvent>,
    pub handle: JoinHandle<()>,
}

impl BackgroundStart {
    /// View the event channel as a stream that ends once the child's output closes.
    pub fn event_stream(&mut self) -> impl Stream<Item = LifecycleEvent> + '_ {
        futures::stream::unfold(&mut self.events, |rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
    }
}

/// Drives the container lifecycle through the compose command line.
#[derive(Debug, Clone)]
pub struct LifecycleRunner {
    container_name: String,
    tracked: Arc<Mutex<Option<i32>>>,
}

impl Default for LifecycleRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER)
    }
}

impl LifecycleRunner {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            tracked: Arc::new(Mutex::new(None)),
        }
    }

    /// Process group of the foreground child, if one is running.
    pub fn tracked_pgid(&self) -> Option<i32> {
        *self.tracked.lock()
    }

    /// Run a command to completion, passing each output line to `on_output` as it arrives.
    ///
    /// The argument vector goes straight to the child; no shell is involved.
    pub async fn start<F>(
        &self,
        command: &CommandLine,
        mut on_output: F,
    ) -> Result<ExitStatus, LifecycleError>
    where
        F: FnMut(&OutputLine),
    {
        let program = command.program();
        tracing::info!(command = %command, "starting child process");

        let mut child = Command::new(program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .context(SpawnSnafu { program })?;

        let pgid = child.id().and_then(|id| i32::try_from(id).ok());
        *self.tracked.lock() = pgid;

        let streamed = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => relay_lines(stdout, stderr, &mut on_output).await,
            _ => Err(std::io::Error::other("child output pipes unavailable")),
        };
        let status = child.wait().await;

        {
            let mut tracked = self.tracked.lock();
            if *tracked == pgid {
                *tracked = None;
            }
        }

        streamed.context(ReadOutputSnafu { program })?;
        let status = status.context(WaitSnafu { program })?;
        tracing::info!(%status, "child process exited");
        Ok(status)
    }

    /// Run [`start`](Self::start) on a background task.
    ///
    /// Output crosses to the caller through `events`; `on_complete` receives the exit result.
    pub fn start_background<C>(&self, command: CommandLine, on_complete: C) -> BackgroundStart
    where
        C: FnOnce(Result<ExitStatus, LifecycleError>) + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();
        let runner = self.clone();

        let handle = tokio::spawn(async move {
            let mut started = false;
            let result = runner
                .start(&command, |line| {
                    // The receiver may be gone; the child still runs to completion.
                    let _ = tx.send(LifecycleEvent::Output(line.clone()));
                    if !started && line.marks_started() {
                        started = true;
                        let _ = tx.send(LifecycleEvent::Started);
                    }
                })
                .await;
            on_complete(result);
        });

        BackgroundStart { events, handle }
    }

    /// Send SIGTERM to the tracked process group.
    ///
    /// Returns `Ok(false)` when nothing is tracked or the group is already gone.
    pub fn terminate(&self) -> Result<bool, LifecycleError> {
        self.signal_group(Signal::SIGTERM)
    }

    /// Send SIGKILL to the tracked process group, for a child that ignores SIGTERM.
    pub fn kill(&self) -> Result<bool, LifecycleError> {
        self.signal_group(Signal::SIGKILL)
    }

    fn signal_group(&self, signal: Signal) -> Result<bool, LifecycleError> {
        let Some(pgid) = self.tracked_pgid() else {
            tracing::debug!(%signal, "no tracked process to signal");
            return Ok(false);
        };

        match killpg(Pid::from_raw(pgid), signal) {
            Ok(()) => {
                tracing::info!(pgid, %signal, "signalled process group");
                Ok(true)
            }
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(e).context(SignalSnafu { pgid }),
        }
    }

    /// Stop and remove the project's containers.
    ///
    /// Terminates a tracked foreground child, runs `compose stop -t <grace>` so an
    /// unresponsive container is killed after the grace period, then `compose down`.
    /// Returns whether `down` succeeded.
    pub async fn stop(
        &self,
        compose: &CommandLine,
        grace: Duration,
    ) -> Result<bool, LifecycleError> {
        self.terminate()?;

        let secs = grace.as_secs().to_string();
        let stop = compose.with_args(["stop", "-t", secs.as_str()]);
        let stopped = capture(&stop, grace + STOP_SLACK).await?;
        if !stopped.status.success() {
            tracing::warn!(
                "compose stop failed: {}",
                String::from_utf8_lossy(&stopped.stderr).trim()
            );
        }

        let down = capture(&compose.with_args(["down"]), DOWN_TIMEOUT).await?;
        Ok(down.status.success())
    }

    /// Stop the project, then start it again with `up_args`.
    pub async fn restart<F>(
        &self,
        compose: &CommandLine,
        up_args: &[String],
        grace: Duration,
        on_output: F,
    ) -> Result<ExitStatus, LifecycleError>
    where
        F: FnMut(&OutputLine),
    {
        if !self.stop(compose, grace).await? {
            return Err(LifecycleError::StopFailed);
        }
        self.start(&compose.with_args(up_args.iter().cloned()), on_output)
            .await
    }

    /// Stream `compose logs`, optionally following and limiting to the last `tail` lines.
    pub async fn logs<F>(
        &self,
        compose: &CommandLine,
        follow: bool,
        tail: Option<u32>,
        on_output: F,
    ) -> Result<ExitStatus, LifecycleError>
    where
        F: FnMut(&OutputLine),
    {
        let mut args = vec!["logs".to_string()];
        if follow {
            args.push("-f".to_string());
        }
        if let Some(n) = tail {
            args.push("--tail".to_string());
            args.push(n.to_string());
        }
        self.start(&compose.with_args(args), on_output).await
    }

    /// Query whether the project's container is running.
    pub async fn status(&self, compose: &CommandLine) -> RunningState {
        self.inspect(compose).await.state
    }

    /// Run `compose ps --format json` and interpret the result.
    pub async fn inspect(&self, compose: &CommandLine) -> ContainerStatus {
        let ps = compose.with_args(["ps", "--format", "json"]);
        match capture(&ps, STATUS_TIMEOUT).await {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let running = stdout
                    .to_lowercase()
                    .contains(&self.container_name.to_lowercase());
                ContainerStatus {
                    state: if running {
                        RunningState::Running
                    } else {
                        RunningState::Stopped
                    },
                    detail: stdout,
                }
            }
            Ok(output) => ContainerStatus {
                state: RunningState::Unknown,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => {
                tracing::debug!("status query failed: {e}");
                ContainerStatus {
                    state: RunningState::Unknown,
                    detail: e.to_string(),
                }
            }
        }
    }
}

/// Run a command to completion with a deadline, capturing its output.
pub(crate) async fn capture(
    command: &CommandLine,
    timeout: Duration,
) -> Result<Output, LifecycleError> {
    let program = command.program();
    tracing::debug!(command = %command, "running captured command");

    let child = Command::new(program)
        .args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context(SpawnSnafu { program })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.context(WaitSnafu { program }),
        Err(_) => TimeoutSnafu { program, timeout }.fail(),
    }
}

/// Forward stdout and stderr lines as they arrive until both pipes close.
async fn relay_lines<O, E, F>(stdout: O, stderr: E, on_output: &mut F) -> std::io::Result<()>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    F: FnMut(&OutputLine),
{
    let mut out = BufReader::new(stdout).split(b'\n');
    let mut err = BufReader::new(stderr).split(b'\n');
    let (mut out_open, mut err_open) = (true, true);

    while out_open || err_open {
        tokio::select! {
            segment = out.next_segment(), if out_open => match segment? {
                Some(bytes) => on_output(&OutputLine::stdout(decode_line(&bytes))),
                None => out_open = false,
            },
            segment = err.next_segment(), if err_open => match segment? {
                Some(bytes) => on_output(&OutputLine::stderr(decode_line(&bytes))),
                None => err_open = false,
            },
        }
    }
    Ok(())
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\r')
        .to_string()
}
