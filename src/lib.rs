//! focus-eeg-core: webcam attention cues to synthetic EEG telemetry
//!
//! Each camera frame is reduced to head and eye measurements, folded into a
//! focused/distracted state, and mapped to eight band powers with
//! correlated noise. Every reading is serialized to a fixed JSON record,
//! sealed with AES-256-CBC, Base64 encoded and published under a topic.
//!
//! - Per-frame vision analysis behind camera/detector traits
//! - Hysteresis-stabilized attention classification with blink counting
//! - Seeded, reproducible band-power synthesis
//! - Layered TOML configuration with environment overrides
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use focus_eeg_core::config::{ConfigLoader, SystemConfig};
//! use focus_eeg_core::pipeline::{FocusPipeline, StopToken};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut loader = ConfigLoader::new().with_base(SystemConfig::classic());
//!     let config = loader.load_system_config()?;
//!
//!     let mut pipeline = FocusPipeline::from_config(&config)?;
//!     let summary = pipeline.run(&StopToken::new());
//!     println!("focus ratio {:.2}", summary.focus_ratio);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod attention;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod synthesis;
pub mod telemetry;
pub mod utils;
pub mod vision;

// Re-export commonly used types for convenience
pub use attention::{AttentionClassifier, AttentionState};
pub use config::{ConfigLoader, SystemConfig};
pub use error::{FocusError, FocusResult};
pub use pipeline::{FocusPipeline, PipelineMetrics, RunSummary, StopToken};
pub use synthesis::{BandPowers, EegReading, SignalSynthesizer};
pub use telemetry::{AesCbcEnvelope, TelemetryEncoder, TelemetryPublisher};
pub use utils::time::TimeProvider;
pub use vision::{FrameMeasurement, VisionFrameAnalyzer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    let mut features = vec![
        "Simulated camera subject".to_string(),
        "AES-256-CBC telemetry envelope".to_string(),
    ];
    if cfg!(feature = "desktop") {
        features.push("Redis pub/sub sink".to_string());
    }
    if cfg!(feature = "opencv") {
        features.push("OpenCV capture and cascades".to_string());
    }
    if cfg!(feature = "cli") {
        features.push("Command line interface".to_string());
    }

    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Webcam attention inference and synthetic EEG band-power telemetry".to_string(),
        features,
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// Compiled-in capabilities
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(info.features.len() >= 2);
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "focus-eeg-core");
    }
}
