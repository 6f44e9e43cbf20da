// ABOUTME: Start command implementation.
// ABOUTME: Confirms, validates, grants X access, then runs compose up with live output.

use super::context::{Launch, escalate, finish, report_issues};
use crate::cli::GlobalArgs;
use craftpod::compose::CommandLine;
use craftpod::error::{Error, Result};
use craftpod::lifecycle::{LifecycleEvent, RunningState, grant_x_access};
use craftpod::output::{Output, OutputMode};
use craftpod::types::Display;
use futures::StreamExt;
use nix::unistd::{User, getuid};
use std::io::IsTerminal;
use tokio::sync::oneshot;

/// Validate the host and start the launcher container.
pub async fn start(args: &GlobalArgs, output: &mut Output) -> Result<()> {
    let launch = Launch::prepare(args, output).await?;
    output.config_table(&launch.config, &launch.sources);

    if !confirm(args, output)? {
        output.progress("Cancelled.");
        return Ok(());
    }

    output.progress("→ Validating system...");
    let report = launch.validate().await;
    report_issues(&report, output)?;

    let compose = launch.compose_command()?;
    if launch.runner.status(&compose).await == RunningState::Running {
        return Err(Error::AlreadyRunning);
    }

    if launch.config.display == Display::X11 && launch.config.auto_xhost {
        ensure_x_access(output).await;
    }

    let up = compose.with_args(args.up_args());
    output.progress(&format!("→ Running: {}", up.preview()));
    output.start_timer();
    run_launcher(&launch, up, output).await?;

    if args.detached {
        output.success("Launcher started in the background");
    } else {
        output.success("Launcher exited");
    }
    Ok(())
}

fn confirm(args: &GlobalArgs, output: &Output) -> Result<bool> {
    if args.yes || output.mode() != OutputMode::Normal || !std::io::stdin().is_terminal() {
        return Ok(true);
    }

    dialoguer::Confirm::new()
        .with_prompt("Start with this configuration?")
        .default(true)
        .interact()
        .map_err(|e| Error::Prompt(e.to_string()))
}

async fn ensure_x_access(output: &Output) {
    let Some(user) = current_user() else {
        output.warning("Could not determine the current user; skipping X access grant");
        return;
    };

    if grant_x_access(&user).await {
        tracing::info!(%user, "granted X server access");
    } else {
        output.warning(&format!(
            "Could not grant X access; run: xhost +SI:localuser:{user}"
        ));
    }
}

fn current_user() -> Option<String> {
    std::env::var("USER")
        .ok()
        .filter(|user| !user.is_empty())
        .or_else(|| {
            User::from_uid(getuid())
                .ok()
                .flatten()
                .map(|user| user.name)
        })
}

/// Run `up` on a background task, relaying its events until the child exits.
async fn run_launcher(launch: &Launch, up: CommandLine, output: &Output) -> Result<()> {
    let program = up.program().to_string();
    let (done_tx, done_rx) = oneshot::channel();
    let mut background = launch.runner.start_background(up, move |result| {
        let _ = done_tx.send(result);
    });

    let mut interrupts = 0;
    {
        let events = background.event_stream();
        tokio::pin!(events);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(LifecycleEvent::Output(line)) => output.child_line(&line),
                    Some(LifecycleEvent::Started) => output.success("Launcher is up"),
                    None => break,
                },
                _ = &mut ctrl_c => {
                    interrupts += 1;
                    escalate(&launch.runner, output, interrupts);
                    ctrl_c.set(tokio::signal::ctrl_c());
                }
            }
        }
    }

    let result = done_rx
        .await
        .map_err(|_| Error::Io(std::io::Error::other("launcher task ended early")))?;
    finish(&program, result?, interrupts > 0)
}
