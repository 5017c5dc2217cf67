// src/config/constants.rs
//! System-wide configuration constants

/// Camera acquisition constants
pub mod camera {
    pub const DEFAULT_SOURCE: &str = "0";
    pub const DEFAULT_FRAME_WIDTH: usize = 640;
    pub const DEFAULT_FRAME_HEIGHT: usize = 480;
    pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 250;
    pub const DEFAULT_RECONNECT_MAX_DELAY_MS: u64 = 1000;
    pub const MAX_RECONNECT_DELAY_MS: u64 = 60_000;
    pub const DEFAULT_FACE_CASCADE_PATH: &str = "haarcascade_frontalface_default.xml";
    pub const DEFAULT_EYE_CASCADE_PATH: &str = "haarcascade_eye.xml";
}

/// Face/eye measurement constants
pub mod vision {
    pub const DEFAULT_STABILIZER_THRESHOLD_PX: i32 = 5;
    pub const MAX_STABILIZER_THRESHOLD_PX: i32 = 100;
    pub const DEFAULT_EYEBROW_CROP_FRACTION: f64 = 0.30;

    /// Gaze offset reported when it cannot be measured
    pub const GAZE_UNKNOWN: f64 = 1.0;

    pub const DEFAULT_FACE_SCALE_FACTOR: f64 = 1.1;
    pub const DEFAULT_FACE_MIN_NEIGHBORS: i32 = 4;
    pub const DEFAULT_EYE_SCALE_FACTOR: f64 = 1.1;
    pub const DEFAULT_EYE_MIN_NEIGHBORS: i32 = 3;
}

/// Attention classification constants
pub mod attention {
    pub const DEFAULT_YAW_THRESHOLD_PX: f64 = 80.0;
    pub const CLASSIC_GAZE_THRESHOLD: f64 = 0.4;
    pub const ADHD_GAZE_THRESHOLD: f64 = 0.5;
}

/// Band synthesis constants
pub mod synthesis {
    pub const BAND_COUNT: usize = 8;
    pub const BAND_NAMES: [&str; BAND_COUNT] = [
        "delta",
        "theta",
        "low_alpha",
        "high_alpha",
        "low_beta",
        "high_beta",
        "low_gamma",
        "mid_gamma",
    ];

    pub const DEFAULT_PINK_NOISE_ALPHA: f64 = 0.95;
    pub const DEFAULT_PINK_NOISE_SCALE: f64 = 10.0;
    pub const WHITE_NOISE_HALF_RANGE: f64 = 0.5;

    pub const DEFAULT_MUSCLE_VELOCITY_THRESHOLD: f64 = 5.0;
    pub const DEFAULT_MUSCLE_NOISE_MAX: f64 = 8000.0;
}

/// Telemetry record and envelope constants
pub mod telemetry {
    pub const DEFAULT_TOPIC: &str = "EEG_SECURE";
    pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
    pub const DEFAULT_ZMQ_ENDPOINT: &str = "tcp://*:5555";
    pub const AES_KEY_BYTES: usize = 32;
    pub const AES_IV_BYTES: usize = 16;

    pub const BAND_DECIMALS: usize = 0;
    pub const VISION_DECIMALS: usize = 2;
}

/// Run loop constants
pub mod run {
    pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
    pub const MAX_FRAME_INTERVAL_MS: u64 = 10_000;
}

/// Configuration file locations, lowest precedence first
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/focus-eeg/config.toml";
    pub const USER_CONFIG_DIR: &str = ".focus-eeg";
    pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";
    pub const ENV_PREFIX: &str = "FOCUS_EEG_";
}
