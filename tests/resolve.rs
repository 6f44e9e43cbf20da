// ABOUTME: Integration tests for configuration resolution.
// ABOUTME: Covers the override > preference > detection precedence for every field.

use craftpod::config::{
    OverrideRecord, PreferenceRecord, Source, resolve, resolve_with_sources,
};
use craftpod::detect::DetectionRecord;
use craftpod::types::{Audio, Display, Gpu, Runtime};
use proptest::prelude::*;

fn detection() -> DetectionRecord {
    DetectionRecord {
        runtime: Runtime::Podman,
        gpu: Gpu::Nvidia,
        display: Display::X11,
        audio: Audio::PulseAudio,
    }
}

// =============================================================================
// Exhaustive precedence
// =============================================================================

/// Test: every combination of set/unset override and preference, per field, picks the
/// highest-precedence source. Each source uses a value distinct from the others.
#[test]
fn precedence_over_all_source_combinations() {
    let detected = detection();

    // Four fields, each with (override set?, preference set?) => 4^4 cases.
    for mask in 0u32..256 {
        let bit = |field: u32, source: u32| mask & (1 << (field * 2 + source)) != 0;

        let overrides = OverrideRecord {
            runtime: bit(0, 0).then_some(Runtime::Docker),
            gpu: bit(1, 0).then_some(Gpu::Amd),
            display: bit(2, 0).then_some(Display::Wayland),
            audio: bit(3, 0).then_some(Audio::None),
        };
        let preferences = PreferenceRecord {
            runtime: bit(0, 1).then_some(Runtime::None),
            gpu: bit(1, 1).then_some(Gpu::None),
            display: bit(2, 1).then_some(Display::None),
            audio: bit(3, 1).then_some(Audio::PulseAudio),
            ..PreferenceRecord::default()
        };

        let (config, sources) = resolve_with_sources(&overrides, &preferences, &detected);

        let expect_source = |field: u32| match (bit(field, 0), bit(field, 1)) {
            (true, _) => Source::Override,
            (false, true) => Source::Preference,
            (false, false) => Source::Detection,
        };

        assert_eq!(
            config.runtime,
            overrides
                .runtime
                .or(preferences.runtime)
                .unwrap_or(detected.runtime),
            "runtime, mask {mask:#010b}"
        );
        assert_eq!(
            config.gpu,
            overrides.gpu.or(preferences.gpu).unwrap_or(detected.gpu),
            "gpu, mask {mask:#010b}"
        );
        assert_eq!(
            config.display,
            overrides
                .display
                .or(preferences.display)
                .unwrap_or(detected.display),
            "display, mask {mask:#010b}"
        );
        assert_eq!(
            config.audio,
            overrides
                .audio
                .or(preferences.audio)
                .unwrap_or(detected.audio),
            "audio, mask {mask:#010b}"
        );

        assert_eq!(sources.runtime, expect_source(0));
        assert_eq!(sources.gpu, expect_source(1));
        assert_eq!(sources.display, expect_source(2));
        assert_eq!(sources.audio, expect_source(3));
    }
}

#[test]
fn empty_inputs_yield_detection() {
    let config = resolve(
        &OverrideRecord::default(),
        &PreferenceRecord::default(),
        &detection(),
    );
    assert_eq!(config.runtime, Runtime::Podman);
    assert_eq!(config.gpu, Gpu::Nvidia);
    assert_eq!(config.display, Display::X11);
    assert_eq!(config.audio, Audio::PulseAudio);
}

#[test]
fn fields_resolve_independently() {
    // Wayland with an NVIDIA GPU is not rejected at this stage.
    let overrides = OverrideRecord {
        display: Some(Display::Wayland),
        ..OverrideRecord::default()
    };
    let config = resolve(&overrides, &PreferenceRecord::default(), &detection());
    assert_eq!(config.display, Display::Wayland);
    assert_eq!(config.gpu, Gpu::Nvidia);
}

#[test]
fn blank_preference_falls_through_to_detection() {
    let preferences = PreferenceRecord::from_yaml("runtime: \"\"\ngpu: \"  \"\n").unwrap();
    let config = resolve(&OverrideRecord::default(), &preferences, &detection());
    assert_eq!(config.runtime, Runtime::Podman);
    assert_eq!(config.gpu, Gpu::Nvidia);
}

#[test]
fn preference_settings_flow_into_effective_config() {
    let preferences =
        PreferenceRecord::from_yaml("auto_xhost: false\nstop_timeout: 30s\n").unwrap();
    let config = resolve(&OverrideRecord::default(), &preferences, &detection());
    assert!(!config.auto_xhost);
    assert_eq!(config.stop_timeout, std::time::Duration::from_secs(30));
}

// =============================================================================
// Property tests
// =============================================================================

fn runtime() -> impl Strategy<Value = Runtime> + Clone {
    prop::sample::select(Runtime::ALL.to_vec())
}

fn gpu() -> impl Strategy<Value = Gpu> + Clone {
    prop::sample::select(Gpu::ALL.to_vec())
}

fn display() -> impl Strategy<Value = Display> + Clone {
    prop::sample::select(Display::ALL.to_vec())
}

fn audio() -> impl Strategy<Value = Audio> + Clone {
    prop::sample::select(Audio::ALL.to_vec())
}

/// Override, preference, and detected value for one field.
fn layered<S>(choice: S) -> impl Strategy<Value = (Option<S::Value>, Option<S::Value>, S::Value)>
where
    S: Strategy + Clone,
{
    (
        prop::option::of(choice.clone()),
        prop::option::of(choice.clone()),
        choice,
    )
}

proptest! {
    /// Test: resolve is total and applies precedence for arbitrary well-typed inputs.
    #[test]
    fn resolve_applies_precedence(
        (o_rt, p_rt, d_rt) in layered(runtime()),
        (o_gpu, p_gpu, d_gpu) in layered(gpu()),
        (o_disp, p_disp, d_disp) in layered(display()),
        (o_audio, p_audio, d_audio) in layered(audio()),
    ) {
        let overrides = OverrideRecord {
            runtime: o_rt,
            gpu: o_gpu,
            display: o_disp,
            audio: o_audio,
        };
        let preferences = PreferenceRecord {
            runtime: p_rt,
            gpu: p_gpu,
            display: p_disp,
            audio: p_audio,
            ..PreferenceRecord::default()
        };
        let detected = DetectionRecord {
            runtime: d_rt,
            gpu: d_gpu,
            display: d_disp,
            audio: d_audio,
        };

        let config = resolve(&overrides, &preferences, &detected);

        prop_assert_eq!(config.runtime, o_rt.or(p_rt).unwrap_or(d_rt));
        prop_assert_eq!(config.gpu, o_gpu.or(p_gpu).unwrap_or(d_gpu));
        prop_assert_eq!(config.display, o_disp.or(p_disp).unwrap_or(d_disp));
        prop_assert_eq!(config.audio, o_audio.or(p_audio).unwrap_or(d_audio));
    }
}
