// src/config/mod.rs
//! Layered configuration for the focus telemetry pipeline

pub mod constants;
pub mod loader;

pub use loader::{ConfigError, ConfigLoader};

use crate::synthesis::profiles::ProfilePreset;
use crate::utils::check_range;
use constants::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub attention: AttentionConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Where frames come from
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    /// Built-in rendered subject, no camera needed
    #[default]
    Simulated,
    /// OpenCV capture (feature `opencv`)
    Opencv,
}

impl FromStr for CameraBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(CameraBackend::Simulated),
            "opencv" => Ok(CameraBackend::Opencv),
            other => Err(format!("unknown camera backend '{}'", other)),
        }
    }
}

impl fmt::Display for CameraBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraBackend::Simulated => write!(f, "simulated"),
            CameraBackend::Opencv => write!(f, "opencv"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default = "defaults::camera_backend")]
    pub backend: CameraBackend,

    /// Device index ("0") or stream URL for the OpenCV backend
    #[serde(default = "defaults::camera_source")]
    pub source: String,

    #[serde(default = "defaults::frame_width")]
    pub frame_width: usize,

    #[serde(default = "defaults::frame_height")]
    pub frame_height: usize,

    #[serde(default = "defaults::reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    #[serde(default = "defaults::reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,

    /// Probability of an empty read from the simulated subject
    #[serde(default)]
    pub simulated_dropout: f64,

    #[serde(default = "defaults::face_cascade_path")]
    pub face_cascade_path: String,

    #[serde(default = "defaults::eye_cascade_path")]
    pub eye_cascade_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VisionConfig {
    #[serde(default = "defaults::enabled")]
    pub stabilize_face: bool,

    #[serde(default = "defaults::stabilizer_threshold_px")]
    pub stabilizer_threshold_px: i32,

    #[serde(default = "defaults::eyebrow_crop_fraction")]
    pub eyebrow_crop_fraction: f64,

    #[serde(default = "defaults::face_scale_factor")]
    pub face_scale_factor: f64,

    #[serde(default = "defaults::face_min_neighbors")]
    pub face_min_neighbors: i32,

    #[serde(default = "defaults::eye_scale_factor")]
    pub eye_scale_factor: f64,

    #[serde(default = "defaults::eye_min_neighbors")]
    pub eye_min_neighbors: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AttentionConfig {
    #[serde(default = "defaults::yaw_threshold_px")]
    pub yaw_threshold_px: f64,

    #[serde(default = "defaults::gaze_threshold")]
    pub gaze_threshold: f64,

    /// Derive head velocity from frame-to-frame yaw changes
    #[serde(default = "defaults::enabled")]
    pub track_head_velocity: bool,
}

impl AttentionConfig {
    pub fn adhd() -> Self {
        Self {
            gaze_threshold: attention::ADHD_GAZE_THRESHOLD,
            track_head_velocity: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub preset: ProfilePreset,

    #[serde(default = "defaults::pink_noise_alpha")]
    pub pink_noise_alpha: f64,

    #[serde(default = "defaults::pink_noise_scale")]
    pub pink_noise_scale: f64,

    #[serde(default = "defaults::muscle_velocity_threshold")]
    pub muscle_velocity_threshold: f64,

    #[serde(default = "defaults::muscle_noise_max")]
    pub muscle_noise_max: f64,

    /// Fixed RNG seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Transport for sealed records
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stdout,
    /// Redis pub/sub (feature `desktop`)
    Redis,
    /// ZeroMQ PUB socket bound at `zmq_endpoint` (feature `zmq`)
    Zmq,
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(SinkKind::Stdout),
            "redis" => Ok(SinkKind::Redis),
            "zmq" => Ok(SinkKind::Zmq),
            other => Err(format!("unknown sink '{}'", other)),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Stdout => write!(f, "stdout"),
            SinkKind::Redis => write!(f, "redis"),
            SinkKind::Zmq => write!(f, "zmq"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TelemetryConfig {
    #[serde(default = "defaults::topic")]
    pub topic: String,

    #[serde(default)]
    pub sink: SinkKind,

    #[serde(default = "defaults::redis_url")]
    pub redis_url: String,

    /// Bind address for the PUB socket
    #[serde(default = "defaults::zmq_endpoint")]
    pub zmq_endpoint: String,

    /// AES-256 key, 64 hex characters
    #[serde(default)]
    pub key_hex: String,

    /// CBC IV, 32 hex characters
    #[serde(default)]
    pub iv_hex: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RunConfig {
    #[serde(default = "defaults::frame_interval_ms")]
    pub frame_interval_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u64>,

    /// Give up after this many consecutive empty reads; retry forever if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnect_attempts: Option<u32>,

    #[serde(default)]
    pub show_debug_window: bool,
}

/// Default value providers using constants
mod defaults {
    use super::CameraBackend;
    use crate::config::constants::*;

    pub fn enabled() -> bool { true }

    pub fn camera_backend() -> CameraBackend { CameraBackend::Simulated }
    pub fn camera_source() -> String { camera::DEFAULT_SOURCE.to_string() }
    pub fn frame_width() -> usize { camera::DEFAULT_FRAME_WIDTH }
    pub fn frame_height() -> usize { camera::DEFAULT_FRAME_HEIGHT }
    pub fn reconnect_base_delay_ms() -> u64 { camera::DEFAULT_RECONNECT_BASE_DELAY_MS }
    pub fn reconnect_max_delay_ms() -> u64 { camera::DEFAULT_RECONNECT_MAX_DELAY_MS }
    pub fn face_cascade_path() -> String { camera::DEFAULT_FACE_CASCADE_PATH.to_string() }
    pub fn eye_cascade_path() -> String { camera::DEFAULT_EYE_CASCADE_PATH.to_string() }

    pub fn stabilizer_threshold_px() -> i32 { vision::DEFAULT_STABILIZER_THRESHOLD_PX }
    pub fn eyebrow_crop_fraction() -> f64 { vision::DEFAULT_EYEBROW_CROP_FRACTION }
    pub fn face_scale_factor() -> f64 { vision::DEFAULT_FACE_SCALE_FACTOR }
    pub fn face_min_neighbors() -> i32 { vision::DEFAULT_FACE_MIN_NEIGHBORS }
    pub fn eye_scale_factor() -> f64 { vision::DEFAULT_EYE_SCALE_FACTOR }
    pub fn eye_min_neighbors() -> i32 { vision::DEFAULT_EYE_MIN_NEIGHBORS }

    pub fn yaw_threshold_px() -> f64 { attention::DEFAULT_YAW_THRESHOLD_PX }
    pub fn gaze_threshold() -> f64 { attention::CLASSIC_GAZE_THRESHOLD }

    pub fn pink_noise_alpha() -> f64 { synthesis::DEFAULT_PINK_NOISE_ALPHA }
    pub fn pink_noise_scale() -> f64 { synthesis::DEFAULT_PINK_NOISE_SCALE }
    pub fn muscle_velocity_threshold() -> f64 { synthesis::DEFAULT_MUSCLE_VELOCITY_THRESHOLD }
    pub fn muscle_noise_max() -> f64 { synthesis::DEFAULT_MUSCLE_NOISE_MAX }

    pub fn topic() -> String { telemetry::DEFAULT_TOPIC.to_string() }
    pub fn redis_url() -> String { telemetry::DEFAULT_REDIS_URL.to_string() }
    pub fn zmq_endpoint() -> String { telemetry::DEFAULT_ZMQ_ENDPOINT.to_string() }

    pub fn frame_interval_ms() -> u64 { run::DEFAULT_FRAME_INTERVAL_MS }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: defaults::camera_backend(),
            source: defaults::camera_source(),
            frame_width: defaults::frame_width(),
            frame_height: defaults::frame_height(),
            reconnect_base_delay_ms: defaults::reconnect_base_delay_ms(),
            reconnect_max_delay_ms: defaults::reconnect_max_delay_ms(),
            simulated_dropout: 0.0,
            face_cascade_path: defaults::face_cascade_path(),
            eye_cascade_path: defaults::eye_cascade_path(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            stabilize_face: defaults::enabled(),
            stabilizer_threshold_px: defaults::stabilizer_threshold_px(),
            eyebrow_crop_fraction: defaults::eyebrow_crop_fraction(),
            face_scale_factor: defaults::face_scale_factor(),
            face_min_neighbors: defaults::face_min_neighbors(),
            eye_scale_factor: defaults::eye_scale_factor(),
            eye_min_neighbors: defaults::eye_min_neighbors(),
        }
    }
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            yaw_threshold_px: defaults::yaw_threshold_px(),
            gaze_threshold: defaults::gaze_threshold(),
            track_head_velocity: defaults::enabled(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            preset: ProfilePreset::Classic,
            pink_noise_alpha: defaults::pink_noise_alpha(),
            pink_noise_scale: defaults::pink_noise_scale(),
            muscle_velocity_threshold: defaults::muscle_velocity_threshold(),
            muscle_noise_max: defaults::muscle_noise_max(),
            seed: None,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            topic: defaults::topic(),
            sink: SinkKind::Stdout,
            redis_url: defaults::redis_url(),
            zmq_endpoint: defaults::zmq_endpoint(),
            key_hex: String::new(),
            iv_hex: String::new(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: defaults::frame_interval_ms(),
            max_frames: None,
            max_reconnect_attempts: None,
            show_debug_window: false,
        }
    }
}

const REDACTED: &str = "<redacted>";

impl SystemConfig {
    /// Focus-ratio variant: gaze threshold 0.4, head velocity tracked
    pub fn classic() -> Self {
        Self::default()
    }

    /// Looser gaze threshold, no head-velocity modelling, ADHD band profiles
    pub fn adhd() -> Self {
        let mut config = Self::default();
        config.apply_preset(ProfilePreset::Adhd);
        config
    }

    /// Overwrite the preset-dependent fields
    pub fn apply_preset(&mut self, preset: ProfilePreset) {
        self.attention = match preset {
            ProfilePreset::Classic => AttentionConfig {
                yaw_threshold_px: self.attention.yaw_threshold_px,
                ..AttentionConfig::default()
            },
            ProfilePreset::Adhd => AttentionConfig {
                yaw_threshold_px: self.attention.yaw_threshold_px,
                ..AttentionConfig::adhd()
            },
        };
        self.synthesis.preset = preset;
    }

    /// Collect every violation instead of stopping at the first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let cam = &self.camera;
        check_range(&mut errors, "camera.frame_width", cam.frame_width, 16, 7680);
        check_range(&mut errors, "camera.frame_height", cam.frame_height, 16, 4320);
        check_range(&mut errors, "camera.reconnect_base_delay_ms", cam.reconnect_base_delay_ms, 1, camera::MAX_RECONNECT_DELAY_MS);
        check_range(&mut errors, "camera.reconnect_max_delay_ms", cam.reconnect_max_delay_ms, 1, camera::MAX_RECONNECT_DELAY_MS);
        if cam.reconnect_base_delay_ms > cam.reconnect_max_delay_ms {
            errors.push(format!(
                "camera.reconnect_base_delay_ms ({}) exceeds camera.reconnect_max_delay_ms ({})",
                cam.reconnect_base_delay_ms, cam.reconnect_max_delay_ms
            ));
        }
        check_range(&mut errors, "camera.simulated_dropout", cam.simulated_dropout, 0.0, 1.0);
        if cam.source.trim().is_empty() {
            errors.push("camera.source must not be empty".to_string());
        }

        let vis = &self.vision;
        check_range(&mut errors, "vision.stabilizer_threshold_px", vis.stabilizer_threshold_px, 0, vision::MAX_STABILIZER_THRESHOLD_PX);
        check_range(&mut errors, "vision.eyebrow_crop_fraction", vis.eyebrow_crop_fraction, 0.0, 0.9);
        check_range(&mut errors, "vision.face_scale_factor", vis.face_scale_factor, 1.01, 2.0);
        check_range(&mut errors, "vision.eye_scale_factor", vis.eye_scale_factor, 1.01, 2.0);
        check_range(&mut errors, "vision.face_min_neighbors", vis.face_min_neighbors, 0, 50);
        check_range(&mut errors, "vision.eye_min_neighbors", vis.eye_min_neighbors, 0, 50);

        check_range(&mut errors, "attention.yaw_threshold_px", self.attention.yaw_threshold_px, 0.0, 10_000.0);
        check_range(&mut errors, "attention.gaze_threshold", self.attention.gaze_threshold, 0.0, 1.0);

        let syn = &self.synthesis;
        check_range(&mut errors, "synthesis.pink_noise_alpha", syn.pink_noise_alpha, 0.0, 0.9999);
        check_range(&mut errors, "synthesis.pink_noise_scale", syn.pink_noise_scale, 0.0, 1.0e6);
        check_range(&mut errors, "synthesis.muscle_velocity_threshold", syn.muscle_velocity_threshold, 0.0, 10_000.0);
        check_range(&mut errors, "synthesis.muscle_noise_max", syn.muscle_noise_max, 0.0, 1.0e6);

        let tel = &self.telemetry;
        if tel.topic.is_empty() || tel.topic.contains(char::is_whitespace) {
            errors.push(format!("telemetry.topic '{}' must be a single non-empty word", tel.topic));
        }
        if tel.sink == SinkKind::Zmq && !tel.zmq_endpoint.contains("://") {
            errors.push(format!(
                "telemetry.zmq_endpoint '{}' must be a transport address such as tcp://*:5555",
                tel.zmq_endpoint
            ));
        }
        if tel.key_hex.trim().is_empty() || tel.iv_hex.trim().is_empty() {
            errors.push("telemetry.key_hex and telemetry.iv_hex must both be set".to_string());
        } else if let Err(e) = crate::telemetry::AesCbcEnvelope::from_hex(&tel.key_hex, &tel.iv_hex) {
            errors.push(format!("telemetry key material: {}", e));
        }

        check_range(&mut errors, "run.frame_interval_ms", self.run.frame_interval_ms, 0, run::MAX_FRAME_INTERVAL_MS);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy with key material replaced, for printing and export
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for field in [&mut copy.telemetry.key_hex, &mut copy.telemetry.iv_hex] {
            if !field.is_empty() {
                *field = REDACTED.to_string();
            }
        }
        copy
    }

    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            preset: self.synthesis.preset,
            camera_backend: self.camera.backend,
            camera_source: self.camera.source.clone(),
            yaw_threshold_px: self.attention.yaw_threshold_px,
            gaze_threshold: self.attention.gaze_threshold,
            track_head_velocity: self.attention.track_head_velocity,
            sink: self.telemetry.sink,
            topic: self.telemetry.topic.clone(),
            frame_interval_ms: self.run.frame_interval_ms,
            max_frames: self.run.max_frames,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub preset: ProfilePreset,
    pub camera_backend: CameraBackend,
    pub camera_source: String,
    pub yaw_threshold_px: f64,
    pub gaze_threshold: f64,
    pub track_head_velocity: bool,
    pub sink: SinkKind,
    pub topic: String,
    pub frame_interval_ms: u64,
    pub max_frames: Option<u64>,
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "preset:              {}", self.preset)?;
        writeln!(f, "camera:              {} ({})", self.camera_backend, self.camera_source)?;
        writeln!(f, "yaw threshold:       {} px", self.yaw_threshold_px)?;
        writeln!(f, "gaze threshold:      {}", self.gaze_threshold)?;
        writeln!(f, "head velocity:       {}", if self.track_head_velocity { "tracked" } else { "off" })?;
        writeln!(f, "sink:                {} (topic {})", self.sink, self.topic)?;
        write!(f, "frame interval:      {} ms", self.frame_interval_ms)?;
        if let Some(max) = self.max_frames {
            write!(f, ", stop after {} frames", max)?;
        }
        Ok(())
    }
}
