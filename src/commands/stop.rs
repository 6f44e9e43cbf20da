// ABOUTME: Stop and restart command implementations.
// ABOUTME: Stop gives the container its grace period before compose down removes it.

use super::context::{Launch, finish, until_interrupted};
use crate::cli::GlobalArgs;
use craftpod::error::Result;
use craftpod::lifecycle::LifecycleError;
use craftpod::output::Output;

/// Stop and remove the launcher container.
pub async fn stop(args: &GlobalArgs, output: &mut Output) -> Result<()> {
    let launch = Launch::prepare(args, output).await?;
    let compose = launch.compose_command()?;

    output.progress("→ Stopping launcher...");
    output.start_timer();
    if !launch
        .runner
        .stop(&compose, launch.config.stop_timeout)
        .await?
    {
        return Err(LifecycleError::StopFailed.into());
    }

    output.success("Launcher stopped");
    Ok(())
}

/// Stop the launcher container, then bring it up again.
pub async fn restart(args: &GlobalArgs, output: &mut Output) -> Result<()> {
    let launch = Launch::prepare(args, output).await?;
    let compose = launch.compose_command()?;
    let up_args = args.up_args();

    output.progress("→ Restarting launcher...");
    output.start_timer();

    let output: &Output = output;
    let restart = launch.runner.restart(
        &compose,
        &up_args,
        launch.config.stop_timeout,
        |line| output.child_line(line),
    );
    let (result, interrupted) = until_interrupted(&launch.runner, output, restart).await;
    finish(compose.program(), result?, interrupted)?;

    output.success("Launcher restarted");
    Ok(())
}
