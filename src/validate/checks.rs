// ABOUTME: Individual pre-flight checks run by the validator.
// ABOUTME: Each inspects one concern and yields at most one issue, except compose files.

use super::{Subject, ValidationIssue};
use crate::compose::ComposeBuilder;
use crate::config::EffectiveConfig;
use crate::host::{HostProbe, PROBE_TIMEOUT, ProbeError, pulse_socket_path};
use crate::types::{Audio, Display, Gpu, Runtime};
use std::path::Path;
use std::time::Duration;

const RUNTIME_VERSION_TIMEOUT: Duration = Duration::from_secs(5);
const X11_SOCKET_DIR: &str = "/tmp/.X11-unix";

pub async fn runtime(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    let Some(binary) = config.runtime.binary() else {
        return Some(
            ValidationIssue::error(Subject::Runtime, "No container runtime found")
                .with_hint(format!("Install Podman: {}", Runtime::Podman.install_url())),
        );
    };

    if probe.which(binary).is_none() {
        return Some(
            ValidationIssue::error(
                Subject::Runtime,
                format!("{binary} is not installed or not in PATH"),
            )
            .with_hint(format!("Install {binary}: {}", config.runtime.install_url())),
        );
    }

    match probe.run(binary, &["--version"], RUNTIME_VERSION_TIMEOUT).await {
        Ok(output) if output.success() => None,
        Ok(_) => Some(
            ValidationIssue::error(
                Subject::Runtime,
                format!("{binary} is installed but not working properly"),
            )
            .with_hint(format!(
                "Try running '{binary} --version' manually to see the error"
            )),
        ),
        Err(ProbeError::Timeout(_)) => Some(ValidationIssue::warning(
            Subject::Runtime,
            format!("{binary} command timed out"),
        )),
        Err(e) => Some(ValidationIssue::warning(
            Subject::Runtime,
            format!("Error checking {binary}: {e}"),
        )),
    }
}

pub fn gpu(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    match config.gpu {
        Gpu::Nvidia if !has_nvidia_node(probe) => Some(
            ValidationIssue::error(
                Subject::Gpu,
                "NVIDIA GPU selected but no /dev/nvidia* device node found",
            )
            .with_hint("Install NVIDIA drivers or select another GPU type"),
        ),
        Gpu::Amd if !has_dri_node(probe) => Some(
            ValidationIssue::error(
                Subject::Gpu,
                "AMD GPU selected but no /dev/dri device found",
            )
            .with_hint("Install Mesa drivers or select another GPU type"),
        ),
        _ => None,
    }
}

pub fn gpu_control(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    (config.gpu == Gpu::Nvidia && !probe.path_exists(Path::new("/dev/nvidiactl"))).then(|| {
        ValidationIssue::warning(Subject::Gpu, "/dev/nvidiactl device not found")
            .with_hint("NVIDIA drivers may not be properly installed")
    })
}

/// Any `/dev/nvidia*` entry, so a host detected through `nvidiactl` alone passes.
fn has_nvidia_node(probe: &dyn HostProbe) -> bool {
    probe
        .list_dir(Path::new("/dev"))
        .iter()
        .any(|name| name.starts_with("nvidia"))
}

fn has_dri_node(probe: &dyn HostProbe) -> bool {
    probe
        .list_dir(Path::new("/dev/dri"))
        .iter()
        .any(|name| name.starts_with("card") || name.starts_with("renderD"))
}

pub fn display(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    let Some(var) = config.display.env_var() else {
        return Some(
            ValidationIssue::error(Subject::Display, "No display server found")
                .with_hint("Run from an X11 or Wayland desktop session"),
        );
    };

    probe.env_var(var).is_none().then(|| {
        let session = match config.display {
            Display::Wayland => "a Wayland",
            _ => "an X11",
        };
        ValidationIssue::error(
            Subject::Display,
            format!("{} selected but {var} environment variable not set", config.display),
        )
        .with_hint(format!("Ensure you're running in {session} session"))
    })
}

pub fn x11_socket(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    (config.display == Display::X11 && !probe.path_exists(Path::new(X11_SOCKET_DIR))).then(|| {
        ValidationIssue::warning(
            Subject::Display,
            format!("X11 socket directory {X11_SOCKET_DIR} not found"),
        )
    })
}

pub fn audio(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    if config.audio != Audio::PulseAudio {
        return None;
    }

    let socket = probe.uid().map(pulse_socket_path);
    let present = socket.as_deref().is_some_and(|path| probe.path_exists(path));
    (!present).then(|| {
        let location = socket
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "/run/user/<uid>/pulse/native".to_string());
        ValidationIssue::warning(
            Subject::Audio,
            format!("PulseAudio socket not found at {location}"),
        )
        .with_hint("Audio may not work. Start PulseAudio/PipeWire or select 'none' for audio")
    })
}

pub fn sound_devices(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    (config.audio == Audio::PulseAudio && !probe.path_exists(Path::new("/dev/snd"))).then(|| {
        ValidationIssue::warning(Subject::Audio, "/dev/snd not found - ALSA devices unavailable")
            .with_hint("Audio hardware may not be accessible")
    })
}

/// One error per missing fragment file. Nothing when the set cannot be built; the
/// runtime and display checks already cover that.
pub fn compose_files(builder: &ComposeBuilder, config: &EffectiveConfig) -> Vec<ValidationIssue> {
    let Ok(set) = builder.build(config) else {
        return Vec::new();
    };

    builder
        .missing_fragments(&set)
        .into_iter()
        .map(|missing| {
            ValidationIssue::error(
                Subject::ComposeFile,
                format!(
                    "Compose file not found: {}",
                    missing.expected_path.display()
                ),
            )
            .with_hint(format!(
                "Ensure {} exists in {}",
                missing.fragment.file_name(),
                builder.root().display()
            ))
        })
        .collect()
}

pub async fn x_access(probe: &dyn HostProbe, config: &EffectiveConfig) -> Option<ValidationIssue> {
    if config.display != Display::X11 || !config.auto_xhost {
        return None;
    }

    if probe.which("xhost").is_none() {
        return Some(
            ValidationIssue::warning(Subject::XAccess, "xhost command not found")
                .with_hint("Install xhost or manually allow X11 access"),
        );
    }

    match probe.run("xhost", &[], PROBE_TIMEOUT).await {
        Ok(output) if output.success() && !output.stdout.contains("SI:localuser:") => Some(
            ValidationIssue::warning(Subject::XAccess, "X11 access may need to be granted")
                .with_hint("Will attempt to run: xhost +SI:localuser:$USER"),
        ),
        _ => None,
    }
}
