// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted fake host probe, fragment directories, and tracing setup.

use async_trait::async_trait;
use craftpod::config::EffectiveConfig;
use craftpod::host::{HostProbe, ProbeError, ProbeOutput};
use craftpod::types::{Audio, Display, Gpu, Runtime};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("craftpod=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Every fragment file a complete install ships.
#[allow(dead_code)]
pub const ALL_FRAGMENTS: [&str; 9] = [
    "base",
    "podman",
    "docker",
    "nvidia",
    "amd",
    "x11",
    "wayland",
    "audio-pulseaudio",
    "audio-none",
];

/// A temporary compose directory containing `compose.<id>.yaml` for each id.
#[allow(dead_code)]
pub fn fragment_dir(ids: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for id in ids {
        std::fs::write(
            dir.path().join(format!("compose.{id}.yaml")),
            format!("# {id}\nservices: {{}}\n"),
        )
        .unwrap();
    }
    dir
}

#[allow(dead_code)]
pub fn effective(runtime: Runtime, gpu: Gpu, display: Display, audio: Audio) -> EffectiveConfig {
    EffectiveConfig {
        runtime,
        gpu,
        display,
        audio,
        auto_xhost: true,
        stop_timeout: Duration::from_secs(5),
    }
}

/// Host probe answering from scripted state. Anything not scripted is absent.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    binaries: HashMap<String, PathBuf>,
    paths: HashSet<PathBuf>,
    dirs: HashMap<PathBuf, Vec<String>>,
    env: HashMap<String, String>,
    uid: Option<u32>,
    commands: HashMap<String, Result<ProbeOutput, ProbeError>>,
}

#[allow(dead_code)]
impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A workstation with podman, an NVIDIA card, an X11 session, and PulseAudio.
    pub fn workstation() -> Self {
        Self::new()
            .with_binary("podman")
            .with_command("podman --version", Ok(ProbeOutput::new(0, "podman version 5.0.0")))
            .with_dir("/dev", &["nvidia0", "nvidiactl", "snd"])
            .with_path("/dev/nvidia0")
            .with_path("/dev/nvidiactl")
            .with_path("/dev/snd")
            .with_path("/tmp/.X11-unix")
            .with_env("XDG_SESSION_TYPE", "x11")
            .with_env("DISPLAY", ":0")
            .with_uid(1000)
            .with_path("/run/user/1000/pulse/native")
            .with_binary("xhost")
            .with_command(
                "xhost",
                Ok(ProbeOutput::new(
                    0,
                    "access control enabled\nSI:localuser:player\n",
                )),
            )
    }

    pub fn with_binary(mut self, name: &str) -> Self {
        self.binaries
            .insert(name.to_string(), PathBuf::from(format!("/usr/bin/{name}")));
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(path.into());
        self
    }

    pub fn without_path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.remove(path.as_ref());
        self
    }

    /// Script a directory listing; the directory itself then exists.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>, entries: &[&str]) -> Self {
        let dir = dir.into();
        self.paths.insert(dir.clone());
        self.dirs
            .insert(dir, entries.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.env.insert(name.to_string(), value.to_string());
        self
    }

    pub fn without_env(mut self, name: &str) -> Self {
        self.env.remove(name);
        self
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Script the result of `program args...`, keyed by the space-joined command.
    pub fn with_command(mut self, command: &str, result: Result<ProbeOutput, ProbeError>) -> Self {
        self.commands.insert(command.to_string(), result);
        self
    }
}

#[async_trait]
impl HostProbe for FakeProbe {
    fn which(&self, binary: &str) -> Option<PathBuf> {
        self.binaries.get(binary).cloned()
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    fn list_dir(&self, dir: &Path) -> Vec<String> {
        self.dirs.get(dir).cloned().unwrap_or_default()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }

    fn uid(&self) -> Option<u32> {
        self.uid
    }

    async fn run(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<ProbeOutput, ProbeError> {
        let key = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.commands
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::NotFound(program.to_string())))
    }
}
