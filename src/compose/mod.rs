// ABOUTME: Maps an effective configuration to ordered compose fragments and a command line.
// ABOUTME: Fragment order is fixed: base, runtime, gpu (optional), display, audio.

mod command;
mod discover;
mod error;

pub use command::CommandLine;
pub use discover::{COMPOSE_DIR_ENV, discover_compose_dir, first_with_base};
pub use error::{ComposeError, MissingFragmentFile};

use crate::config::EffectiveConfig;
use crate::types::{Audio, Display, Gpu, Runtime};
use nonempty::NonEmpty;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of one compose fragment, e.g. `nvidia` or `audio-none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(&'static str);

impl FragmentId {
    pub const BASE: FragmentId = FragmentId("base");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// File name of the fragment inside the compose directory.
    pub fn file_name(&self) -> String {
        format!("compose.{}.yaml", self.0)
    }

    fn for_runtime(runtime: Runtime) -> Option<Self> {
        match runtime {
            Runtime::Podman => Some(FragmentId("podman")),
            Runtime::Docker => Some(FragmentId("docker")),
            Runtime::None => None,
        }
    }

    fn for_gpu(gpu: Gpu) -> Option<Self> {
        match gpu {
            Gpu::Nvidia => Some(FragmentId("nvidia")),
            Gpu::Amd => Some(FragmentId("amd")),
            Gpu::None => None,
        }
    }

    fn for_display(display: Display) -> Option<Self> {
        match display {
            Display::X11 => Some(FragmentId("x11")),
            Display::Wayland => Some(FragmentId("wayland")),
            Display::None => None,
        }
    }

    fn for_audio(audio: Audio) -> Self {
        match audio {
            Audio::PulseAudio => FragmentId("audio-pulseaudio"),
            Audio::None => FragmentId("audio-none"),
        }
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Ordered fragments for one configuration, plus the runtime binary that layers them.
///
/// Always starts with `base`. The binary and the runtime fragment come from the same
/// resolved runtime, so they always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeFragmentSet {
    binary: &'static str,
    fragments: NonEmpty<FragmentId>,
}

impl ComposeFragmentSet {
    /// Runtime executable, `podman` or `docker`.
    pub fn binary(&self) -> &'static str {
        self.binary
    }

    pub fn fragments(&self) -> &NonEmpty<FragmentId> {
        &self.fragments
    }

    pub fn iter(&self) -> impl Iterator<Item = &FragmentId> {
        self.fragments.iter()
    }

    /// Fragment identifiers in order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.fragments.iter().map(FragmentId::as_str).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fragments.iter().any(|f| f.as_str() == id)
    }
}

/// Builds compose fragment sets and command lines for fragments under `root`.
#[derive(Debug, Clone)]
pub struct ComposeBuilder {
    root: PathBuf,
}

impl ComposeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fragment_path(&self, fragment: &FragmentId) -> PathBuf {
        self.root.join(fragment.file_name())
    }

    /// Derive the ordered fragment set for a configuration.
    ///
    /// Fails when runtime or display resolved to `none`. A `none` GPU omits the GPU
    /// fragment; audio always contributes one.
    pub fn build(&self, config: &EffectiveConfig) -> Result<ComposeFragmentSet, ComposeError> {
        let (binary, runtime) = config
            .runtime
            .binary()
            .zip(FragmentId::for_runtime(config.runtime))
            .ok_or(ComposeError::Config {
                field: "runtime",
                value: config.runtime.as_str(),
            })?;
        let display = FragmentId::for_display(config.display).ok_or(ComposeError::Config {
            field: "display",
            value: config.display.as_str(),
        })?;

        let mut fragments = NonEmpty::new(FragmentId::BASE);
        fragments.push(runtime);
        if let Some(gpu) = FragmentId::for_gpu(config.gpu) {
            fragments.push(gpu);
        }
        fragments.push(display);
        fragments.push(FragmentId::for_audio(config.audio));

        Ok(ComposeFragmentSet { binary, fragments })
    }

    /// Every fragment in the set whose file is absent, in fragment order.
    pub fn missing_fragments(&self, set: &ComposeFragmentSet) -> Vec<MissingFragmentFile> {
        set.iter()
            .map(|fragment| (fragment, self.fragment_path(fragment)))
            .filter(|(_, path)| !path.is_file())
            .map(|(fragment, expected_path)| MissingFragmentFile {
                fragment: *fragment,
                expected_path,
            })
            .collect()
    }

    /// Render `<binary> compose -f <frag1> ... -f <fragN> <extra_args...>`.
    ///
    /// Verifies all fragment files first and reports every missing one.
    pub fn render<I, S>(
        &self,
        set: &ComposeFragmentSet,
        extra_args: I,
    ) -> Result<CommandLine, ComposeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(missing) = NonEmpty::from_vec(self.missing_fragments(set)) {
            tracing::debug!(count = missing.len(), "compose fragments missing");
            return Err(ComposeError::MissingFragments(missing));
        }

        let mut args = vec!["compose".to_string()];
        for fragment in set.iter() {
            args.push("-f".to_string());
            let path = self.fragment_path(fragment);
            match path.to_str() {
                Some(path) => args.push(path.to_string()),
                None => return Err(ComposeError::NonUtf8Path(path)),
            }
        }

        Ok(CommandLine::new(set.binary(), args).with_args(extra_args))
    }

    /// Build and render the bare compose command (no action) for a configuration.
    pub fn compose_command(&self, config: &EffectiveConfig) -> Result<CommandLine, ComposeError> {
        let set = self.build(config)?;
        self.render(&set, std::iter::empty::<String>())
    }
}
