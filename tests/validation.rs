// ABOUTME: Integration tests for pre-flight validation against a scripted host.
// ABOUTME: Tests severities, check order, and that no check short-circuits another.

mod support;

use craftpod::compose::ComposeBuilder;
use craftpod::host::{ProbeError, ProbeOutput};
use craftpod::types::{Audio, Display, Gpu, Runtime};
use craftpod::validate::{Severity, Subject, Validator};
use std::time::Duration;
use support::{ALL_FRAGMENTS, FakeProbe, effective, fragment_dir};

fn workstation_config() -> craftpod::config::EffectiveConfig {
    effective(Runtime::Podman, Gpu::Nvidia, Display::X11, Audio::PulseAudio)
}

#[tokio::test]
async fn healthy_workstation_has_no_issues() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation();

    let report = Validator::new(&probe, &builder)
        .validate(&workstation_config())
        .await;
    assert!(report.is_empty(), "{:?}", report.issues());
    assert!(report.is_valid());
}

#[tokio::test]
async fn missing_runtime_binary_is_exactly_one_error() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    // Only podman is installed.
    let probe = FakeProbe::workstation();

    let config = effective(Runtime::Docker, Gpu::Nvidia, Display::X11, Audio::PulseAudio);
    let report = Validator::new(&probe, &builder).validate(&config).await;

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1, "{:?}", report.issues());
    assert_eq!(errors[0].subject, Subject::Runtime);
    assert!(errors[0].message.contains("docker"));
    assert!(
        errors[0]
            .fix_hint
            .as_deref()
            .is_some_and(|hint| hint.contains("docker"))
    );
}

#[tokio::test]
async fn missing_pulse_socket_is_exactly_one_warning() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation().without_path("/run/user/1000/pulse/native");

    let report = Validator::new(&probe, &builder)
        .validate(&workstation_config())
        .await;
    let audio: Vec<_> = report
        .issues()
        .iter()
        .filter(|issue| issue.subject == Subject::Audio)
        .collect();
    assert_eq!(audio.len(), 1);
    assert_eq!(audio[0].severity, Severity::Warning);
    assert!(report.is_valid());
}

#[tokio::test]
async fn broken_runtime_is_an_error_and_slow_runtime_a_warning() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());

    let broken = FakeProbe::workstation()
        .with_command("podman --version", Ok(ProbeOutput::new(125, "")));
    let report = Validator::new(&broken, &builder)
        .validate(&workstation_config())
        .await;
    assert_eq!(report.errors().count(), 1);
    assert!(report.issues()[0].message.contains("not working"));

    let slow = FakeProbe::workstation().with_command(
        "podman --version",
        Err(ProbeError::Timeout(Duration::from_secs(5))),
    );
    let report = Validator::new(&slow, &builder)
        .validate(&workstation_config())
        .await;
    assert!(report.is_valid());
    assert_eq!(report.issues()[0].severity, Severity::Warning);
    assert!(report.issues()[0].message.contains("timed out"));
}

#[tokio::test]
async fn gpu_without_device_nodes_is_an_error() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation();

    let amd = effective(Runtime::Podman, Gpu::Amd, Display::X11, Audio::PulseAudio);
    let report = Validator::new(&probe, &builder).validate(&amd).await;
    let gpu_errors: Vec<_> = report
        .errors()
        .filter(|issue| issue.subject == Subject::Gpu)
        .collect();
    assert_eq!(gpu_errors.len(), 1);
    assert!(gpu_errors[0].message.contains("/dev/dri"));

    let render_only = FakeProbe::workstation().with_dir("/dev/dri", &["renderD128"]);
    let report = Validator::new(&render_only, &builder).validate(&amd).await;
    assert!(report.is_valid(), "{:?}", report.issues());
}

#[tokio::test]
async fn host_detected_through_nvidiactl_alone_validates() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation()
        .with_dir("/dev", &["nvidiactl", "snd"])
        .without_path("/dev/nvidia0");

    assert_eq!(craftpod::detect::detect_gpu(&probe).await, Gpu::Nvidia);
    let report = Validator::new(&probe, &builder)
        .validate(&workstation_config())
        .await;
    assert!(report.is_empty(), "{:?}", report.issues());
}

#[tokio::test]
async fn nvidia_control_node_missing_is_a_warning() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation()
        .with_dir("/dev", &["nvidia0", "snd"])
        .without_path("/dev/nvidiactl");

    let report = Validator::new(&probe, &builder)
        .validate(&workstation_config())
        .await;
    assert!(report.is_valid());
    assert_eq!(report.warnings().count(), 1);
    assert!(report.issues()[0].message.contains("nvidiactl"));
}

#[tokio::test]
async fn display_variable_must_match_kind() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation();

    let wayland = effective(Runtime::Podman, Gpu::Nvidia, Display::Wayland, Audio::PulseAudio);
    let report = Validator::new(&probe, &builder).validate(&wayland).await;
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].subject, Subject::Display);
    assert!(errors[0].message.contains("WAYLAND_DISPLAY"));
}

#[tokio::test]
async fn every_check_runs_and_order_is_registration_order() {
    // Nothing on the host, nothing on disk.
    let empty = tempfile::tempdir().unwrap();
    let builder = ComposeBuilder::new(empty.path());
    let probe = FakeProbe::new();

    let report = Validator::new(&probe, &builder)
        .validate(&workstation_config())
        .await;
    let subjects: Vec<_> = report.issues().iter().map(|i| i.subject).collect();
    assert_eq!(
        subjects,
        vec![
            Subject::Runtime,
            Subject::Gpu,
            Subject::Gpu,
            Subject::Display,
            Subject::Display,
            Subject::Audio,
            Subject::Audio,
            Subject::ComposeFile,
            Subject::ComposeFile,
            Subject::ComposeFile,
            Subject::ComposeFile,
            Subject::ComposeFile,
            Subject::XAccess,
        ]
    );
    assert!(!report.is_valid());
}

#[tokio::test]
async fn unbuildable_config_skips_compose_file_check() {
    let empty = tempfile::tempdir().unwrap();
    let builder = ComposeBuilder::new(empty.path());
    let probe = FakeProbe::workstation();

    let config = effective(Runtime::None, Gpu::None, Display::None, Audio::None);
    let report = Validator::new(&probe, &builder).validate(&config).await;
    let subjects: Vec<_> = report.errors().map(|i| i.subject).collect();
    assert_eq!(subjects, vec![Subject::Runtime, Subject::Display]);
}

#[tokio::test]
async fn x_access_checked_only_for_x11_with_auto_xhost() {
    let dir = fragment_dir(&ALL_FRAGMENTS);
    let builder = ComposeBuilder::new(dir.path());
    let probe = FakeProbe::workstation()
        .with_command("xhost", Ok(ProbeOutput::new(0, "access control enabled\n")));

    let mut config = workstation_config();
    let report = Validator::new(&probe, &builder).validate(&config).await;
    assert_eq!(report.warnings().count(), 1);
    assert_eq!(report.issues()[0].subject, Subject::XAccess);

    config.auto_xhost = false;
    let report = Validator::new(&probe, &builder).validate(&config).await;
    assert!(report.is_empty());
}
