// ABOUTME: Doctor command implementation.
// ABOUTME: Prints detection evidence, the resolved configuration, and every validation issue.

use super::context::{Launch, report_issues};
use crate::cli::GlobalArgs;
use craftpod::detect::{DetectionReport, detect_details};
use craftpod::error::Result;
use craftpod::host::SystemProbe;
use craftpod::output::{Output, OutputMode};

/// Diagnose the host without starting anything.
pub async fn doctor(args: &GlobalArgs, output: &mut Output) -> Result<()> {
    output.progress("→ Detecting host capabilities...");
    let report = detect_details(&SystemProbe).await;
    print_detection(&report, output);

    let launch = Launch::from_detection(args, output, &report.detected)?;
    output.config_table(&launch.config, &launch.sources);

    if output.mode() == OutputMode::Normal {
        println!("Compose files: {}", launch.builder.root().display());
        let saved = if launch.store.exists() {
            "saved"
        } else {
            "not saved"
        };
        println!("Preferences:   {} ({saved})", launch.store.path().display());
    }

    output.progress("→ Validating system...");
    let validation = launch.validate().await;
    report_issues(&validation, output)?;

    output.success("System ready");
    Ok(())
}

fn print_detection(report: &DetectionReport, output: &Output) {
    match output.mode() {
        OutputMode::Json => output.json("detection", report),
        OutputMode::Quiet => {}
        OutputMode::Normal => {
            let detected = &report.detected;
            println!("System Detection:");

            let runtime_path = report
                .runtime_path
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default();
            println!("  Runtime  {}{runtime_path}", detected.runtime);

            let devices = if report.gpu_devices_present {
                "devices present"
            } else {
                "no devices"
            };
            println!(
                "  GPU      {}: {} ({devices})",
                detected.gpu, report.gpu_model
            );
            println!("  Display  {}", report.display_summary());
            println!("  Audio    {}: {}", detected.audio, report.audio_server);
        }
    }
}
