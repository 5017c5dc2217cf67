//! Per-frame head and eye measurements
//! Location: src/vision/analyzer.rs

use crate::config::constants::vision::GAZE_UNKNOWN;
use crate::config::VisionConfig;
use crate::vision::gaze::eye_gaze_offset;
use crate::vision::stabilizer::FaceStabilizer;
use crate::vision::traits::ObjectDetector;
use crate::vision::types::{gray_region, Frame, FrameMeasurement, Overlay, OverlayItem, Point, Rect};
use tracing::trace;

/// Measurement for one frame plus its debug annotations
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    pub measurement: FrameMeasurement,
    pub overlay: Overlay,
}

/// Runs the face and eye detectors over a frame and derives yaw and gaze
pub struct VisionFrameAnalyzer {
    face_detector: Box<dyn ObjectDetector>,
    eye_detector: Box<dyn ObjectDetector>,
    stabilizer: FaceStabilizer,
    eyebrow_crop_fraction: f64,
}

impl VisionFrameAnalyzer {
    pub fn new(
        face_detector: Box<dyn ObjectDetector>,
        eye_detector: Box<dyn ObjectDetector>,
        config: &VisionConfig,
    ) -> Self {
        Self {
            face_detector,
            eye_detector,
            stabilizer: FaceStabilizer::new(config.stabilizer_threshold_px, config.stabilize_face),
            eyebrow_crop_fraction: config.eyebrow_crop_fraction,
        }
    }

    /// Whether both models are loaded
    pub fn detectors_loaded(&self) -> (bool, bool) {
        (self.face_detector.is_loaded(), self.eye_detector.is_loaded())
    }

    /// Measure one frame.
    ///
    /// `stable_face` is the held face box from previous frames; it is updated
    /// through the stabilizer. Head velocity is left at 0 for the caller.
    pub fn analyze(&mut self, frame: &Frame, stable_face: &mut Option<Rect>) -> FrameAnalysis {
        let mut overlay = Overlay::default();
        if frame.is_empty() {
            return FrameAnalysis {
                measurement: FrameMeasurement::no_face(),
                overlay,
            };
        }

        let gray = frame.to_gray();
        let faces = self.face_detector.detect(gray.view());
        let Some(&detection) = faces.first() else {
            return FrameAnalysis {
                measurement: FrameMeasurement::no_face(),
                overlay,
            };
        };

        let face = self
            .stabilizer
            .update(stable_face, detection)
            .clamp_to(frame.cols(), frame.rows());
        overlay.push(OverlayItem::FaceBox(face));

        let frame_cx = (frame.cols() / 2) as i32;
        let head_yaw = (face.center_x() - frame_cx).abs() as f64;

        // Eye candidates come back in face-region coordinates
        let face_gray = gray_region(&gray, face);
        let candidates = self.eye_detector.detect(face_gray);

        let mut total_offset = 0.0;
        let mut eyes_found = 0usize;
        for eye in candidates {
            if eye.y > face.height / 2 {
                continue;
            }
            let eye_in_frame = eye.translate(face.x, face.y);
            let gaze = eye_gaze_offset(gray_region(&gray, eye_in_frame), self.eyebrow_crop_fraction);
            total_offset += gaze.offset;
            eyes_found += 1;

            overlay.push(OverlayItem::EyeBox(eye_in_frame));
            if let Some(p) = gaze.pupil {
                overlay.push(OverlayItem::Pupil(Point::new(eye_in_frame.x + p.x, eye_in_frame.y + p.y)));
            }
        }

        let gaze_offset = if eyes_found > 0 {
            total_offset / eyes_found as f64
        } else {
            GAZE_UNKNOWN
        };

        trace!(head_yaw, eyes_found, gaze_offset, "frame measured");

        FrameAnalysis {
            measurement: FrameMeasurement {
                face_found: true,
                face_rect: Some(face),
                head_yaw,
                eyes_found,
                gaze_offset,
                head_velocity: 0.0,
            },
            overlay,
        }
    }
}
