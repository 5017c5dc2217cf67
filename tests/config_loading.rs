// tests/config_loading.rs
//! Configuration files and environment layers feeding a real pipeline

use focus_eeg_core::config::{CameraBackend, ConfigError, ConfigLoader, SinkKind, SystemConfig};
use focus_eeg_core::pipeline::{FocusPipeline, StopReason, StopToken};
use focus_eeg_core::synthesis::ProfilePreset;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[camera]
backend = "simulated"
source = "0"
frame_width = 160
frame_height = 120
reconnect_base_delay_ms = 1
reconnect_max_delay_ms = 4
simulated_dropout = 0.0

[vision]
stabilize_face = true
stabilizer_threshold_px = 5
eyebrow_crop_fraction = 0.3

[attention]
yaw_threshold_px = 80.0
gaze_threshold = 0.4
track_head_velocity = true

[synthesis]
preset = "classic"
pink_noise_alpha = 0.95
pink_noise_scale = 10.0
seed = 99

[telemetry]
topic = "EEG_SECURE"
sink = "stdout"
key_hex = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
iv_hex = "f0e0d0c0b0a090807060504030201000"

[run]
frame_interval_ms = 0
max_frames = 5
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn isolated(prefix: &str) -> ConfigLoader {
    ConfigLoader::with_paths(Vec::new()).with_env_prefix(prefix)
}

#[test]
fn test_full_file_drives_simulated_run() {
    let file = write_config(FULL_CONFIG);
    let config = isolated("FOCUS_EEG_FULLRUN_").with_file(file.path()).load_system_config().unwrap();

    assert_eq!(config.camera.backend, CameraBackend::Simulated);
    assert_eq!(config.telemetry.sink, SinkKind::Stdout);
    assert_eq!(config.synthesis.seed, Some(99));
    assert_eq!(config.run.max_frames, Some(5));

    let mut pipeline = FocusPipeline::from_config(&config).unwrap();
    let summary = pipeline.run(&StopToken::new());
    assert_eq!(summary.stop_reason, StopReason::FrameLimit);
    assert_eq!(summary.metrics.frames_processed, 5);
    assert_eq!(summary.metrics.published_messages, 5);
}

#[test]
fn test_adhd_base_keeps_preset_fields_under_partial_file() {
    let file = write_config(
        r#"
[telemetry]
key_hex = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
iv_hex = "f0e0d0c0b0a090807060504030201000"
"#,
    );
    let config = isolated("FOCUS_EEG_ADHDBASE_")
        .with_base(SystemConfig::adhd())
        .with_file(file.path())
        .load_system_config()
        .unwrap();

    assert_eq!(config.synthesis.preset, ProfilePreset::Adhd);
    assert_eq!(config.attention.gaze_threshold, 0.5);
    assert!(!config.attention.track_head_velocity);
}

#[test]
fn test_validation_reports_every_violation() {
    let file = write_config(
        r#"
[attention]
gaze_threshold = 1.5

[vision]
eyebrow_crop_fraction = 0.95

[telemetry]
topic = "two words"
key_hex = "abcd"
iv_hex = "f0e0d0c0b0a090807060504030201000"
"#,
    );
    let err = isolated("FOCUS_EEG_VIOLATIONS_")
        .with_file(file.path())
        .load_system_config()
        .unwrap_err();

    match err {
        ConfigError::ValidationError(errors) => {
            assert_eq!(errors.len(), 4, "{:?}", errors);
            assert!(errors.iter().any(|e| e.contains("attention.gaze_threshold")));
            assert!(errors.iter().any(|e| e.contains("vision.eyebrow_crop_fraction")));
            assert!(errors.iter().any(|e| e.contains("telemetry.topic")));
            assert!(errors.iter().any(|e| e.contains("key material")));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_environment_beats_explicit_file() {
    let file = write_config(FULL_CONFIG);
    std::env::set_var("FOCUS_EEG_LAYERS_RUN_MAX_FRAMES", "2");
    std::env::set_var("FOCUS_EEG_LAYERS_TELEMETRY_TOPIC", "EEG_ALT");

    let result = isolated("FOCUS_EEG_LAYERS_").with_file(file.path()).load_system_config();

    std::env::remove_var("FOCUS_EEG_LAYERS_RUN_MAX_FRAMES");
    std::env::remove_var("FOCUS_EEG_LAYERS_TELEMETRY_TOPIC");

    let config = result.unwrap();
    assert_eq!(config.run.max_frames, Some(2));
    assert_eq!(config.telemetry.topic, "EEG_ALT");
    // Untouched fields still come from the file
    assert_eq!(config.synthesis.seed, Some(99));
}

#[test]
fn test_exported_config_hides_keys() {
    let file = write_config(FULL_CONFIG);
    let mut loader = isolated("FOCUS_EEG_EXPORT_").with_file(file.path());
    loader.load_system_config().unwrap();

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("exported.toml");
    loader.export_config(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("000102030405060708090a0b0c0d0e0f"));
    assert!(text.contains("<redacted>"));
    assert!(text.contains("max_frames = 5"));
}
