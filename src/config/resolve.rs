// ABOUTME: Three-level configuration resolution: CLI override, saved preference, detection.
// ABOUTME: Each field resolves independently; the function is total.

use super::PreferenceRecord;
use crate::detect::DetectionRecord;
use crate::types::{Audio, Display, Gpu, Runtime};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Choices supplied on the command line for a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideRecord {
    pub runtime: Option<Runtime>,
    pub gpu: Option<Gpu>,
    pub display: Option<Display>,
    pub audio: Option<Audio>,
}

impl OverrideRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub runtime: Runtime,
    pub gpu: Gpu,
    pub display: Display,
    pub audio: Audio,
    /// Grant the container's user access to the X server before starting.
    pub auto_xhost: bool,
    /// Grace period given to the container on stop before it is killed.
    #[serde(with = "humantime_serde")]
    pub stop_timeout: Duration,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Override,
    Preference,
    Detection,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Override => write!(f, "flag"),
            Source::Preference => write!(f, "saved"),
            Source::Detection => write!(f, "detected"),
        }
    }
}

/// Per-field provenance of an [`EffectiveConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sources {
    pub runtime: Source,
    pub gpu: Source,
    pub display: Source,
    pub audio: Source,
}

/// Resolve the effective configuration.
///
/// For every field: the override if present, else the saved preference if present,
/// else the detected value.
pub fn resolve(
    overrides: &OverrideRecord,
    preferences: &PreferenceRecord,
    detection: &DetectionRecord,
) -> EffectiveConfig {
    resolve_with_sources(overrides, preferences, detection).0
}

/// Like [`resolve`], also reporting which source won each field.
pub fn resolve_with_sources(
    overrides: &OverrideRecord,
    preferences: &PreferenceRecord,
    detection: &DetectionRecord,
) -> (EffectiveConfig, Sources) {
    let (runtime, runtime_src) = pick(overrides.runtime, preferences.runtime, detection.runtime);
    let (gpu, gpu_src) = pick(overrides.gpu, preferences.gpu, detection.gpu);
    let (display, display_src) = pick(overrides.display, preferences.display, detection.display);
    let (audio, audio_src) = pick(overrides.audio, preferences.audio, detection.audio);

    let config = EffectiveConfig {
        runtime,
        gpu,
        display,
        audio,
        auto_xhost: preferences.auto_xhost,
        stop_timeout: preferences.stop_timeout,
    };
    let sources = Sources {
        runtime: runtime_src,
        gpu: gpu_src,
        display: display_src,
        audio: audio_src,
    };

    tracing::debug!(?config, ?sources, "resolved configuration");
    (config, sources)
}

fn pick<T: Copy>(over: Option<T>, saved: Option<T>, detected: T) -> (T, Source) {
    match (over, saved) {
        (Some(value), _) => (value, Source::Override),
        (None, Some(value)) => (value, Source::Preference),
        (None, None) => (detected, Source::Detection),
    }
}
