// ABOUTME: Host capability detection for runtime, GPU, display server, and audio.
// ABOUTME: Probes never fail; anything inconclusive degrades to the `none` choice.

mod details;

pub use details::{DetectionReport, detect_details};

use crate::host::{HostProbe, PROBE_TIMEOUT, pulse_socket_path};
use crate::types::{Audio, Display, Gpu, Runtime};
use serde::Serialize;
use std::path::Path;

pub(crate) const NVIDIA_NODES: [&str; 2] = ["/dev/nvidia0", "/dev/nvidiactl"];
pub(crate) const DRI_DIR: &str = "/dev/dri";

/// Best-effort snapshot of what the host offers. Produced fresh on every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionRecord {
    pub runtime: Runtime,
    pub gpu: Gpu,
    pub display: Display,
    pub audio: Audio,
}

/// Probe the host for all four capabilities concurrently.
pub async fn detect(probe: &dyn HostProbe) -> DetectionRecord {
    let (runtime, gpu, display, audio) = tokio::join!(
        async { detect_runtime(probe) },
        detect_gpu(probe),
        async { detect_display(probe) },
        detect_audio(probe),
    );

    let record = DetectionRecord {
        runtime,
        gpu,
        display,
        audio,
    };
    tracing::debug!(?record, "host detection finished");
    record
}

/// Detection order:
/// 1. `podman` on `PATH`
/// 2. `docker` on `PATH`
pub fn detect_runtime(probe: &dyn HostProbe) -> Runtime {
    [Runtime::Podman, Runtime::Docker]
        .into_iter()
        .find(|rt| rt.binary().is_some_and(|bin| probe.which(bin).is_some()))
        .unwrap_or(Runtime::None)
}

/// Detection order, first match wins (NVIDIA beats AMD when both look plausible):
/// 1. NVIDIA device nodes
/// 2. A DRI card node
/// 3. `lspci` vendor strings
pub async fn detect_gpu(probe: &dyn HostProbe) -> Gpu {
    if NVIDIA_NODES.iter().any(|node| probe.path_exists(Path::new(node))) {
        return Gpu::Nvidia;
    }

    if has_dri_card(probe) {
        return Gpu::Amd;
    }

    match probe.run("lspci", &[], PROBE_TIMEOUT).await {
        Ok(output) => gpu_from_lspci(&output.stdout),
        Err(e) => {
            tracing::debug!("lspci unavailable: {e}");
            Gpu::None
        }
    }
}

pub(crate) fn has_dri_card(probe: &dyn HostProbe) -> bool {
    probe
        .list_dir(Path::new(DRI_DIR))
        .iter()
        .any(|name| name.starts_with("card"))
}

fn gpu_from_lspci(listing: &str) -> Gpu {
    let listing = listing.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| listing.contains(w));

    if mentions(&["nvidia", "geforce", "quadro", "rtx"]) {
        Gpu::Nvidia
    } else if mentions(&["amd", "radeon"]) {
        Gpu::Amd
    } else if listing.contains("intel") && listing.contains("vga") {
        // Intel shares the DRI device path with AMD.
        Gpu::Amd
    } else {
        Gpu::None
    }
}

/// Detection order:
/// 1. `XDG_SESSION_TYPE` naming x11 or wayland
/// 2. `WAYLAND_DISPLAY` set
/// 3. `DISPLAY` set
pub fn detect_display(probe: &dyn HostProbe) -> Display {
    if let Some(session) = probe.env_var("XDG_SESSION_TYPE")
        && let Ok(display) = session.parse::<Display>()
        && display != Display::None
    {
        return display;
    }

    if probe.env_var("WAYLAND_DISPLAY").is_some() {
        return Display::Wayland;
    }
    if probe.env_var("DISPLAY").is_some() {
        return Display::X11;
    }

    Display::None
}

/// Detection order:
/// 1. Per-user PulseAudio/PipeWire socket
/// 2. `pactl info` reporting a server name
pub async fn detect_audio(probe: &dyn HostProbe) -> Audio {
    if let Some(uid) = probe.uid()
        && probe.path_exists(&pulse_socket_path(uid))
    {
        return Audio::PulseAudio;
    }

    match probe.run("pactl", &["info"], PROBE_TIMEOUT).await {
        Ok(output) if output.success() && output.stdout.contains("Server Name:") => {
            Audio::PulseAudio
        }
        Ok(_) => Audio::None,
        Err(e) => {
            tracing::debug!("pactl unavailable: {e}");
            Audio::None
        }
    }
}
