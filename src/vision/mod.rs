//! Camera frames, detectors and the per-frame head/eye measurement
//!
//! The [`VisionFrameAnalyzer`] turns one frame into a [`FrameMeasurement`].
//! Cameras, cascade models and the debug window sit behind the traits in
//! [`traits`] so the analyzer runs the same against the built-in simulated
//! subject and against OpenCV (feature `opencv`).

pub mod analyzer;
pub mod gaze;
pub mod image_ops;
pub mod simulated;
pub mod stabilizer;
pub mod traits;
pub mod types;

#[cfg(feature = "opencv")]
pub mod opencv_backend;

pub use analyzer::{FrameAnalysis, VisionFrameAnalyzer};
pub use gaze::{eye_gaze_offset, EyeGaze};
pub use simulated::{
    simulated_subject, FixedDetector, ScriptedFrameSource, SceneDetector, SequenceDetector,
    SimulatedCamera, SubjectBehavior,
};
pub use stabilizer::FaceStabilizer;
pub use traits::{DisplaySink, FrameSource, NullDetector, NullDisplay, ObjectDetector};
pub use types::{Frame, FrameMeasurement, Overlay, OverlayColor, OverlayItem, Point, Rect};

use thiserror::Error;

/// Errors from the camera and model backends
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("failed to load {model} model from '{path}': {reason}")]
    ModelLoad {
        model: String,
        path: String,
        reason: String,
    },

    #[error("failed to open camera '{source_name}': {reason}")]
    CameraOpen { source_name: String, reason: String },

    #[error("camera backend error: {0}")]
    Backend(String),
}
