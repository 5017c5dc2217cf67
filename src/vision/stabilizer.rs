//! Hysteresis for the detected face box

use crate::vision::types::Rect;

/// Keeps the previous face box until a detection moves far enough away.
///
/// Consecutive cascade detections of a still head jitter by a pixel or two.
/// The held box is only replaced when none exists yet or the new top-left
/// corner differs by more than `threshold_px` on x or y.
#[derive(Debug, Clone, Copy)]
pub struct FaceStabilizer {
    threshold_px: i32,
    enabled: bool,
}

impl FaceStabilizer {
    pub fn new(threshold_px: i32, enabled: bool) -> Self {
        Self {
            threshold_px: threshold_px.max(0),
            enabled,
        }
    }

    /// Fold a fresh detection into `held` and return the box to measure
    pub fn update(&self, held: &mut Option<Rect>, detection: Rect) -> Rect {
        if !self.enabled {
            *held = Some(detection);
            return detection;
        }

        match held {
            Some(current)
                if !current.is_empty()
                    && (detection.x - current.x).abs() <= self.threshold_px
                    && (detection.y - current.y).abs() <= self.threshold_px =>
            {
                *current
            }
            _ => {
                *held = Some(detection);
                detection
            }
        }
    }
}
