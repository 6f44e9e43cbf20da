// ABOUTME: Pre-flight validation of the effective configuration against the host.
// ABOUTME: Runs every registered check in order and returns the complete issue list.

mod checks;
mod report;

pub use report::{Severity, Subject, ValidationIssue, ValidationReport};

use crate::compose::ComposeBuilder;
use crate::config::EffectiveConfig;
use crate::host::HostProbe;

/// Runs independent checks; none short-circuits another.
pub struct Validator<'a> {
    probe: &'a dyn HostProbe,
    builder: &'a ComposeBuilder,
}

impl<'a> Validator<'a> {
    pub fn new(probe: &'a dyn HostProbe, builder: &'a ComposeBuilder) -> Self {
        Self { probe, builder }
    }

    /// Run all checks in registration order.
    ///
    /// Order: runtime, gpu, gpu control node, display, X11 socket dir, audio,
    /// sound devices, compose files, X access.
    pub async fn validate(&self, config: &EffectiveConfig) -> ValidationReport {
        let probe = self.probe;
        let mut report = ValidationReport::default();

        report.extend(checks::runtime(probe, config).await);
        report.extend(checks::gpu(probe, config));
        report.extend(checks::gpu_control(probe, config));
        report.extend(checks::display(probe, config));
        report.extend(checks::x11_socket(probe, config));
        report.extend(checks::audio(probe, config));
        report.extend(checks::sound_devices(probe, config));
        report.extend(checks::compose_files(self.builder, config));
        report.extend(checks::x_access(probe, config).await);

        tracing::debug!(
            issues = report.issues().len(),
            valid = report.is_valid(),
            "validation finished"
        );
        report
    }
}
