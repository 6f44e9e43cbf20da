// ABOUTME: Shared setup for every container command: preferences, detection, and resolution.
// ABOUTME: Also holds the Ctrl-C aware wait and validation reporting used by several commands.

use crate::cli::GlobalArgs;
use craftpod::compose::{CommandLine, ComposeBuilder, discover_compose_dir};
use craftpod::config::{
    ConfigStore, EffectiveConfig, PreferenceRecord, Sources, resolve_with_sources,
};
use craftpod::detect::{DetectionRecord, detect};
use craftpod::error::{Error, Result};
use craftpod::host::SystemProbe;
use craftpod::lifecycle::LifecycleRunner;
use craftpod::output::Output;
use craftpod::validate::{ValidationReport, Validator};
use std::future::Future;
use std::process::ExitStatus;

/// Everything a command needs to drive the container for this invocation.
pub struct Launch {
    pub probe: SystemProbe,
    pub store: ConfigStore,
    pub config: EffectiveConfig,
    pub sources: Sources,
    pub builder: ComposeBuilder,
    pub runner: LifecycleRunner,
}

impl Launch {
    /// Detect the host, then resolve against preferences and overrides.
    pub async fn prepare(args: &GlobalArgs, output: &Output) -> Result<Self> {
        let probe = SystemProbe;
        output.progress("→ Detecting host capabilities...");
        let detection = detect(&probe).await;
        Self::from_detection(args, output, &detection)
    }

    pub fn from_detection(
        args: &GlobalArgs,
        output: &Output,
        detection: &DetectionRecord,
    ) -> Result<Self> {
        let store = ConfigStore::locate(args.config.as_deref())?;
        let preferences = load_preferences(&store, output);
        let overrides = args.overrides();
        let (config, sources) = resolve_with_sources(&overrides, &preferences, detection);

        if args.save {
            store.save(&preferences.with_overrides(&overrides))?;
            output.progress(&format!(
                "→ Saved preferences to {}",
                store.path().display()
            ));
        }

        let builder = ComposeBuilder::new(discover_compose_dir(args.compose_dir.as_deref()));
        tracing::debug!(root = %builder.root().display(), "using compose directory");

        Ok(Self {
            probe: SystemProbe,
            store,
            config,
            sources,
            builder,
            runner: LifecycleRunner::default(),
        })
    }

    /// The bare compose command for the effective configuration.
    pub fn compose_command(&self) -> Result<CommandLine> {
        Ok(self.builder.compose_command(&self.config)?)
    }

    pub async fn validate(&self) -> ValidationReport {
        Validator::new(&self.probe, &self.builder)
            .validate(&self.config)
            .await
    }
}

/// Load saved preferences, dropping unusable keys and falling back to defaults
/// when the file cannot be read at all.
fn load_preferences(store: &ConfigStore, output: &Output) -> PreferenceRecord {
    match store.load_lenient() {
        Ok((preferences, rejected)) => {
            for entry in rejected {
                output.warning(&format!(
                    "Ignoring '{}' in {}: {}",
                    entry.key,
                    store.path().display(),
                    entry.reason
                ));
            }
            preferences
        }
        Err(e) => {
            output.warning(&format!("{e}; using defaults"));
            PreferenceRecord::default()
        }
    }
}

/// Print every issue and fail when any of them blocks startup.
pub fn report_issues(report: &ValidationReport, output: &Output) -> Result<()> {
    for issue in report.issues() {
        output.issue(issue);
    }

    let blocking = report.errors().count();
    if blocking > 0 {
        return Err(Error::ValidationFailed(blocking));
    }
    Ok(())
}

/// Drive `work` to completion, signalling the runner's child on each Ctrl-C.
///
/// The child is still awaited after the signal. Returns the result and whether
/// an interrupt arrived.
pub async fn until_interrupted<F, T>(
    runner: &LifecycleRunner,
    output: &Output,
    work: F,
) -> (T, bool)
where
    F: Future<Output = T>,
{
    tokio::pin!(work);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupts = 0;

    loop {
        tokio::select! {
            result = &mut work => return (result, interrupts > 0),
            _ = &mut ctrl_c => {
                interrupts += 1;
                escalate(runner, output, interrupts);
                ctrl_c.set(tokio::signal::ctrl_c());
            }
        }
    }
}

/// SIGTERM the child on the first interrupt and SIGKILL it on any later one.
///
/// Signal failures are logged so the caller keeps waiting for the child.
pub fn escalate(runner: &LifecycleRunner, output: &Output, interrupts: u32) {
    let result = if interrupts <= 1 {
        output.warning("Interrupted, stopping the launcher (Ctrl-C again to force)...");
        runner.terminate()
    } else {
        output.warning("Interrupted again, killing the launcher");
        runner.kill()
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "could not signal the launcher");
    }
}

/// Map a finished orchestration process to the command result.
pub fn finish(program: &str, status: ExitStatus, interrupted: bool) -> Result<()> {
    if interrupted {
        return Err(Error::Interrupted);
    }
    if status.success() {
        Ok(())
    } else {
        Err(Error::ChildProcess {
            program: program.to_string(),
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftpod::compose::CommandLine;
    use craftpod::error::{EXIT_CHILD_FAILED, EXIT_INTERRUPTED};
    use craftpod::output::OutputMode;
    use std::os::unix::process::ExitStatusExt;
    use std::time::Duration;

    #[test]
    fn non_zero_child_exit_maps_to_child_failed() {
        let status = ExitStatus::from_raw(3 << 8);
        let err = finish("podman", status, false).unwrap_err();
        assert!(matches!(err, Error::ChildProcess { code: Some(3), .. }));
        assert_eq!(err.exit_code(), EXIT_CHILD_FAILED);
    }

    #[test]
    fn interrupt_wins_over_child_status() {
        let err = finish("podman", ExitStatus::from_raw(15), true).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INTERRUPTED);
        assert!(finish("podman", ExitStatus::from_raw(0), false).is_ok());
    }

    #[tokio::test]
    async fn second_interrupt_kills_a_child_ignoring_sigterm() {
        let output = Output::new(OutputMode::Quiet);
        let runner = LifecycleRunner::default();
        let (done_tx, mut done_rx) = tokio::sync::oneshot::channel();
        let mut background = runner.start_background(
            CommandLine::new("sh", ["-c", "trap '' TERM; echo ready; sleep 30"]),
            move |result| {
                let _ = done_tx.send(result);
            },
        );
        assert!(background.events.recv().await.is_some());

        escalate(&runner, &output, 1);
        assert!(
            tokio::time::timeout(Duration::from_millis(500), &mut done_rx)
                .await
                .is_err()
        );

        escalate(&runner, &output, 2);
        let status = tokio::time::timeout(Duration::from_secs(10), done_rx)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(!status.success());
    }
}
