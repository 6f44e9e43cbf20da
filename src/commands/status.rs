// ABOUTME: Status and logs command implementations.
// ABOUTME: Both resolve the compose command and query the running project.

use super::context::{Launch, finish, until_interrupted};
use crate::cli::GlobalArgs;
use craftpod::config::EffectiveConfig;
use craftpod::error::Result;
use craftpod::lifecycle::{ContainerStatus, RunningState};
use craftpod::output::{Output, OutputMode};
use serde::Serialize;

#[derive(Serialize)]
struct StatusReport<'a> {
    state: RunningState,
    detail: &'a str,
    config: &'a EffectiveConfig,
}

/// Report whether the launcher container is running.
///
/// A configuration that cannot produce a compose command reports `unknown`.
pub async fn status(args: &GlobalArgs, output: &mut Output) -> Result<()> {
    let launch = Launch::prepare(args, output).await?;
    let status = match launch.compose_command() {
        Ok(compose) => launch.runner.inspect(&compose).await,
        Err(e) => {
            tracing::debug!(error = %e, "no compose command to query");
            ContainerStatus {
                state: RunningState::Unknown,
                detail: e.to_string(),
            }
        }
    };

    match output.mode() {
        OutputMode::Json => output.json(
            "status",
            &StatusReport {
                state: status.state,
                detail: &status.detail,
                config: &launch.config,
            },
        ),
        OutputMode::Quiet => println!("{}", status.state),
        OutputMode::Normal => {
            println!("Launcher: {}", status.state);
            if status.state == RunningState::Unknown && !status.detail.is_empty() {
                println!("  ({})", status.detail);
            }
            output.config_table(&launch.config, &launch.sources);
        }
    }
    Ok(())
}

/// Stream container logs. Ctrl-C ends a follow without an error.
pub async fn logs(
    args: &GlobalArgs,
    follow: bool,
    tail: Option<u32>,
    output: &mut Output,
) -> Result<()> {
    let launch = Launch::prepare(args, output).await?;
    let compose = launch.compose_command()?;

    let output: &Output = output;
    let logs = launch
        .runner
        .logs(&compose, follow, tail, |line| output.child_line(line));
    let (result, interrupted) = until_interrupted(&launch.runner, output, logs).await;
    if interrupted {
        return Ok(());
    }
    finish(compose.program(), result?, false)
}
