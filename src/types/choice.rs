// ABOUTME: Enumerated host choices for container runtime, GPU, display, and audio.
// ABOUTME: Parses and formats the lowercase names used on the CLI and in the preference file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string that does not name any variant of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseChoiceError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in probe/preference order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseChoiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str() == normalized)
                    .ok_or_else(|| ParseChoiceError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|choice| choice.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

choice! {
    /// Container runtime used to run the compose project.
    Runtime, "runtime" {
        Podman => "podman",
        Docker => "docker",
        /// Neither runtime is installed.
        None => "none",
    }
}

choice! {
    /// GPU family whose device nodes are passed into the container.
    Gpu, "gpu" {
        Nvidia => "nvidia",
        /// AMD and Intel cards, both served through DRI.
        Amd => "amd",
        None => "none",
    }
}

choice! {
    /// Display server the container renders to.
    Display, "display" {
        X11 => "x11",
        Wayland => "wayland",
        None => "none",
    }
}

choice! {
    /// Audio system shared with the container.
    Audio, "audio" {
        PulseAudio => "pulseaudio",
        None => "none",
    }
}

impl Runtime {
    /// Executable name, or `None` when no runtime was resolved.
    pub fn binary(&self) -> Option<&'static str> {
        match self {
            Runtime::Podman => Some("podman"),
            Runtime::Docker => Some("docker"),
            Runtime::None => None,
        }
    }

    /// Where to point users who need to install this runtime.
    pub fn install_url(&self) -> &'static str {
        match self {
            Runtime::Docker => "https://docs.docker.com/engine/install/",
            Runtime::Podman | Runtime::None => "https://podman.io/getting-started/installation",
        }
    }
}

impl Display {
    /// Environment variable that must be set for this display server to be reachable.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Display::X11 => Some("DISPLAY"),
            Display::Wayland => Some("WAYLAND_DISPLAY"),
            Display::None => None,
        }
    }
}
