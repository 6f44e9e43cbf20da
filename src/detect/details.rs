// ABOUTME: Human-oriented detection details for the doctor command.
// ABOUTME: Adds binary paths, GPU model, session info, and audio server name to detection.

use super::{DRI_DIR, DetectionRecord, NVIDIA_NODES, detect};
use crate::host::{HostProbe, PROBE_TIMEOUT};
use crate::types::{Display, Gpu};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Detection results plus the evidence behind them.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub detected: DetectionRecord,
    /// Resolved path of the runtime binary, if installed.
    pub runtime_path: Option<PathBuf>,
    /// GPU model from `lspci`, or a generic label.
    pub gpu_model: String,
    /// Whether the device nodes for the detected GPU exist.
    pub gpu_devices_present: bool,
    /// Raw `XDG_SESSION_TYPE`, or "unknown".
    pub session_type: String,
    /// Value of the display variable for the detected display server.
    pub display_var: Option<String>,
    /// Audio server reported by `pactl info`.
    pub audio_server: String,
}

/// Detect the host and gather supporting details for display.
pub async fn detect_details(probe: &dyn HostProbe) -> DetectionReport {
    let detected = detect(probe).await;

    let runtime_path = detected.runtime.binary().and_then(|bin| probe.which(bin));
    let (gpu_model, audio_server) =
        tokio::join!(gpu_model(probe, detected.gpu), audio_server(probe));

    DetectionReport {
        detected,
        runtime_path,
        gpu_model,
        gpu_devices_present: gpu_devices_present(probe, detected.gpu),
        session_type: probe
            .env_var("XDG_SESSION_TYPE")
            .unwrap_or_else(|| "unknown".to_string()),
        display_var: detected.display.env_var().and_then(|var| probe.env_var(var)),
        audio_server,
    }
}

async fn gpu_model(probe: &dyn HostProbe, gpu: Gpu) -> String {
    let fallback = format!("{} GPU", gpu.as_str().to_uppercase());
    let Ok(output) = probe.run("lspci", &[], PROBE_TIMEOUT).await else {
        return fallback;
    };

    output
        .stdout
        .lines()
        .find(|line| {
            let lower = line.to_lowercase();
            let is_display = lower.contains("vga") || lower.contains("3d");
            let matches_kind = match gpu {
                Gpu::Nvidia => lower.contains("nvidia"),
                Gpu::Amd => lower.contains("amd") || lower.contains("radeon"),
                Gpu::None => false,
            };
            is_display && matches_kind
        })
        .and_then(|line| line.split_once(": "))
        .map(|(_, model)| model.trim().to_string())
        .unwrap_or(fallback)
}

fn gpu_devices_present(probe: &dyn HostProbe, gpu: Gpu) -> bool {
    match gpu {
        Gpu::Nvidia => probe.path_exists(Path::new(NVIDIA_NODES[0])),
        Gpu::Amd => probe.path_exists(Path::new(DRI_DIR)),
        Gpu::None => false,
    }
}

async fn audio_server(probe: &dyn HostProbe) -> String {
    probe
        .run("pactl", &["info"], PROBE_TIMEOUT)
        .await
        .ok()
        .filter(|output| output.success())
        .and_then(|output| {
            output
                .stdout
                .lines()
                .find_map(|line| line.strip_prefix("Server Name:"))
                .map(|name| name.trim().to_string())
        })
        .unwrap_or_else(|| "No audio detected".to_string())
}

impl DetectionReport {
    /// One-line summary of the display evidence.
    pub fn display_summary(&self) -> String {
        match self.detected.display {
            Display::None => format!("none (session: {})", self.session_type),
            display => format!(
                "{} (session: {}, var: {})",
                display,
                self.session_type,
                self.display_var.as_deref().unwrap_or("")
            ),
        }
    }
}
